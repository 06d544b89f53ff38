//! Client-side core of the blog front-end.
//!
//! Everything here is presentation-agnostic: views hold a view-model, call
//! its async operations, and render from its state. Toasts and navigation
//! requests come out of a [`Notifier`] channel; the theme is published by
//! the [`Session`].
//!
//! ```no_run
//! # async fn demo() -> Result<(), blog_client::ClientError> {
//! use std::sync::Arc;
//! use blog_client::{ApiClient, ClientConfig, FileStorage, ListSource, ListViewModel, Notifier, Session};
//!
//! let config = ClientConfig::from_env()?;
//! let session = Arc::new(Session::open(Arc::new(FileStorage::open("session.json")?))?);
//! let (notifier, _events) = Notifier::channel();
//! let api = ApiClient::new(&config, session, notifier);
//!
//! let mut home = ListViewModel::new(api, config.site_url.clone(), ListSource::AllPosts, config.page_size)
//!     .with_authors();
//! home.load().await?;
//! for post in home.visible() {
//!     println!("{} by {}", post.title, home.author_name(&post.user_id));
//! }
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod config;
pub mod detail;
pub mod editor;
pub mod error;
pub mod guard;
pub mod http;
pub mod list;
pub mod notify;
pub mod session;
pub mod share;
pub mod storage;

pub use account::{Accounts, LoginForm, ProfileForm, SignupForm};
pub use config::ClientConfig;
pub use detail::{DetailState, DetailViewModel};
pub use editor::{PostDraft, PostEditor};
pub use error::{ClientError, ClientResult, StorageError};
pub use guard::{GuardDecision, RouteGuard};
pub use http::{ApiClient, AuthResponse};
pub use list::{
    AuthorFilter, CategoryFilter, ListQuery, ListSource, ListViewModel, LoadState, ScrollPosition,
    filter_posts,
};
pub use notify::{Notifier, Toast, ToastLevel, UiEvent};
pub use session::{Session, SessionStatus, Theme};
pub use share::{SharePlatform, ShareTarget};
pub use storage::{FileStorage, MemoryStorage, Storage};
