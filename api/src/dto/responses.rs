use blog_models::User;
use serde::Serialize;

/// `POST /login` answers with the stored record as-is, password included,
/// exactly like the json-server middleware it replaces.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}
