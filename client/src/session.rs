//! The session store: who is logged in and which theme is active, mirrored
//! into durable storage so both survive a restart.

use crate::{
    error::{ClientError, StorageError},
    storage::{Storage, keys},
};
use blog_models::User;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Durable state has not been read yet; guards must not decide.
    Hydrating,
    Ready,
}

#[derive(Debug)]
struct SessionState {
    user: Option<User>,
    status: SessionStatus,
}

/// Injectable session object shared (via `Arc`) by the HTTP client, the
/// route guard and every view-model.
pub struct Session {
    storage: Arc<dyn Storage>,
    state: RwLock<SessionState>,
    theme: watch::Sender<Theme>,
}

impl Session {
    /// Build a session whose durable state is already loaded, so the first
    /// observable state is the persisted one.
    pub fn open(storage: Arc<dyn Storage>) -> Result<Self, ClientError> {
        let session = Self::deferred(storage);
        session.hydrate()?;
        Ok(session)
    }

    /// Build a session that stays in [`SessionStatus::Hydrating`] until
    /// [`Session::hydrate`] runs.
    pub fn deferred(storage: Arc<dyn Storage>) -> Self {
        let (theme, _) = watch::channel(Theme::Light);
        Self {
            storage,
            state: RwLock::new(SessionState {
                user: None,
                status: SessionStatus::Hydrating,
            }),
            theme,
        }
    }

    /// Read the stored user and theme. Unreadable values are discarded and
    /// treated as absent.
    pub fn hydrate(&self) -> Result<(), ClientError> {
        let user = match self.storage.get(keys::USER)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("discarding unreadable stored user: {}", e);
                    self.storage.remove(keys::USER)?;
                    None
                }
            },
            None => None,
        };

        let dark_mode = match self.storage.get(keys::DARK_MODE)? {
            Some(raw) => serde_json::from_str::<bool>(&raw).unwrap_or_else(|e| {
                warn!("discarding unreadable theme flag: {}", e);
                false
            }),
            None => false,
        };

        {
            let mut state = self.write();
            state.user = user;
            state.status = SessionStatus::Ready;
        }
        self.theme.send_replace(Theme::from_dark_mode(dark_mode));

        Ok(())
    }

    pub fn status(&self) -> SessionStatus {
        self.read().status
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    /// Role check is case-insensitive by construction of [`blog_models::Role`].
    pub fn is_admin(&self) -> bool {
        self.read().user.as_ref().is_some_and(User::is_admin)
    }

    /// The bearer token, read from durable storage on every call.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.storage.get(keys::TOKEN)
    }

    pub fn login(&self, user: User, token: &str) -> Result<(), ClientError> {
        let raw = serde_json::to_string(&user).map_err(StorageError::from)?;
        self.storage.set(keys::USER, &raw)?;
        self.storage.set(keys::TOKEN, token)?;

        info!("session started for {}", user.email);
        self.write().user = Some(user);
        Ok(())
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.clear()?;
        info!("session ended");
        Ok(())
    }

    /// Dropped by the HTTP layer on a 401; same effect as a logout.
    pub(crate) fn expire(&self) -> Result<(), ClientError> {
        self.clear()?;
        warn!("session expired");
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.storage.remove(keys::USER)?;
        self.storage.remove(keys::TOKEN)?;
        self.write().user = None;
        Ok(())
    }

    /// Replace the current user. A record without identity (empty id) is
    /// logged and rejected without touching state.
    pub fn update_user(&self, user: User) -> Result<(), ClientError> {
        if user.id.is_empty() {
            warn!("rejected update_user for {} without an id", user.email);
            return Err(ClientError::Validation("User record has no id".into()));
        }

        let raw = serde_json::to_string(&user).map_err(StorageError::from)?;
        self.storage.set(keys::USER, &raw)?;
        self.write().user = Some(user);
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        *self.theme.borrow()
    }

    pub fn dark_mode(&self) -> bool {
        self.theme().is_dark()
    }

    /// Flip the theme, persist it, and publish it to subscribers.
    pub fn toggle_theme(&self) -> Result<Theme, ClientError> {
        let next = Theme::from_dark_mode(!self.dark_mode());
        self.storage
            .set(keys::DARK_MODE, if next.is_dark() { "true" } else { "false" })?;
        self.theme.send_replace(next);
        Ok(next)
    }

    /// Presentation-layer hook: receives the theme to apply whenever it
    /// changes.
    pub fn subscribe_theme(&self) -> watch::Receiver<Theme> {
        self.theme.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
