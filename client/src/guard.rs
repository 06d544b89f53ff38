use crate::{
    http::LOGIN_PATH,
    notify::Notifier,
    session::{Session, SessionStatus},
};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session present: show the protected view.
    Render,
    /// Session still hydrating: show a placeholder, decide later.
    Loading,
    /// No session: go to `to`, remembering `from` for the post-login return.
    Redirect { to: String, from: String },
}

/// Gate for views that need a logged-in user.
pub struct RouteGuard {
    session: Arc<Session>,
    notifier: Notifier,
    /// Location we last warned about, so re-checks don't repeat the toast.
    warned: Mutex<Option<String>>,
}

impl RouteGuard {
    pub fn new(session: Arc<Session>, notifier: Notifier) -> Self {
        Self {
            session,
            notifier,
            warned: Mutex::new(None),
        }
    }

    pub fn check(&self, location: &str) -> GuardDecision {
        if self.session.status() == SessionStatus::Hydrating {
            return GuardDecision::Loading;
        }

        let mut warned = self.warned.lock().unwrap_or_else(PoisonError::into_inner);

        if self.session.is_authenticated() {
            *warned = None;
            return GuardDecision::Render;
        }

        if warned.as_deref() != Some(location) {
            info!("no user found, redirecting to login from {}", location);
            self.notifier.error("Please log in to access this page!");
            *warned = Some(location.to_string());
        }

        GuardDecision::Redirect {
            to: LOGIN_PATH.to_string(),
            from: location.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        notify::{ToastLevel, UiEvent},
        storage::{MemoryStorage, Storage, keys},
    };
    use blog_models::{Id, Role, User};
    use chrono::Utc;

    fn user() -> User {
        User {
            id: Id::generate(),
            username: "zag".into(),
            email: "zag@example.com".into(),
            password: "secret1".into(),
            role: Role::User,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn anonymous_visitor_is_redirected_once_with_return_location() {
        let session = Arc::new(Session::open(Arc::new(MemoryStorage::new())).unwrap());
        let (notifier, mut rx) = Notifier::channel();
        let guard = RouteGuard::new(session, notifier);

        let decision = guard.check("/profile");
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/login".into(),
                from: "/profile".into()
            }
        );
        guard.check("/profile");

        match rx.try_recv().unwrap() {
            UiEvent::Toast(toast) => assert_eq!(toast.level, ToastLevel::Error),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(rx.try_recv().is_err(), "warning must not repeat");
    }

    #[test]
    fn logged_in_user_sees_the_view() {
        let session = Arc::new(Session::open(Arc::new(MemoryStorage::new())).unwrap());
        session.login(user(), "fake-token").unwrap();
        let guard = RouteGuard::new(session, Notifier::silent());

        assert_eq!(guard.check("/add-post"), GuardDecision::Render);
    }

    #[test]
    fn hydrating_session_shows_placeholder_instead_of_redirecting() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(keys::USER, &serde_json::to_string(&user()).unwrap())
            .unwrap();
        let session = Arc::new(Session::deferred(storage));
        let guard = RouteGuard::new(session.clone(), Notifier::silent());

        assert_eq!(guard.check("/profile"), GuardDecision::Loading);

        session.hydrate().unwrap();
        assert_eq!(guard.check("/profile"), GuardDecision::Render);
    }
}
