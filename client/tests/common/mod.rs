#![allow(dead_code)]

use blog_api::{AppState, Db, app};
use blog_client::{ApiClient, ClientConfig, MemoryStorage, Notifier, Session, UiEvent};
use blog_models::{Category, Id, Post, Role, User};
use chrono::{Duration, Utc};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::mpsc::UnboundedReceiver;

pub const SITE_URL: &str = "https://blog.example";
pub const PAGE_SIZE: usize = 2;

/// A `blog-api` instance listening on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(None).await
    }

    /// Strict mode: writes need a signed token.
    pub async fn start_strict() -> Self {
        Self::start_with(Some("test-secret".to_string())).await
    }

    /// Serve an existing database, e.g. one written by json-server.
    pub async fn start_with_db(db: Db) -> Self {
        Self::serve(AppState::new(db, None)).await
    }

    async fn start_with(secret: Option<String>) -> Self {
        Self::serve(AppState::new(Db::in_memory(), secret)).await
    }

    async fn serve(state: AppState) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let router = app(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&format!("http://{}", self.addr), SITE_URL, PAGE_SIZE).unwrap()
    }

    /// A fresh, logged-out client with its own storage.
    pub fn client(&self) -> Harness {
        Harness::new(self.config())
    }

    /// A client already logged in as `user` through `POST /login`.
    pub async fn client_as(&self, user: &User) -> Harness {
        let harness = self.client();
        let auth = harness.api.login(&user.email, &user.password).await.unwrap();
        harness.session.login(auth.user, &auth.token).unwrap();
        harness
    }

    pub async fn seed_user(&self, username: &str, role: Role) -> User {
        let user = User {
            id: Id::generate(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "secret1".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.state.db.insert_user(user).await.unwrap()
    }

    /// Posts seeded in call order get increasing timestamps, so the server
    /// returns them in that order.
    pub async fn seed_post(&self, author: &User, title: &str, category: Category) -> Post {
        let offset = self.state.db.posts(None).len() as i64;
        let post = Post {
            id: Id::generate(),
            title: title.to_string(),
            description: format!("All about {title}"),
            image_url: "https://img.example.com/p.png".to_string(),
            category,
            user_id: author.id.clone(),
            likes: 0,
            likes_history: vec![],
            comments: vec![],
            created_at: Utc::now() - Duration::hours(24) + Duration::seconds(offset),
            updated_at: None,
        };
        self.state.db.insert_post(post).await.unwrap()
    }

    pub fn stored_post(&self, id: &Id) -> Option<Post> {
        self.state.db.post(id)
    }
}

pub struct Harness {
    pub config: ClientConfig,
    pub session: Arc<Session>,
    pub api: ApiClient,
    pub events: UnboundedReceiver<UiEvent>,
}

impl Harness {
    pub fn new(config: ClientConfig) -> Self {
        let session = Arc::new(Session::open(Arc::new(MemoryStorage::new())).unwrap());
        let (notifier, events) = Notifier::channel();
        let api = ApiClient::new(&config, session.clone(), notifier);
        Self {
            config,
            session,
            api,
            events,
        }
    }

    /// Everything emitted so far.
    pub fn drain(&mut self) -> Vec<UiEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}
