use crate::store::Db;
use std::sync::Arc;

/// Shared across every request. `Db` does its own locking, so handlers only
/// clone the `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Db>,
    /// `Some` switches the server into strict mode: real tokens are issued
    /// and writes must carry one.
    pub jwt_secret: Option<String>,
}

impl AppState {
    pub fn new(db: Db, jwt_secret: Option<String>) -> Self {
        Self {
            db: Arc::new(db),
            jwt_secret,
        }
    }
}
