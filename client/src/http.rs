//! Adapter over the collaborator's REST surface.
//!
//! Attaches the stored bearer token to every request. Any 401 clears the
//! session, sends the user to the login view and comes back as
//! [`ClientError::SessionExpired`]; other failures are handed to the caller.

use crate::{
    config::ClientConfig,
    error::ClientError,
    notify::Notifier,
    session::Session,
};
use blog_models::{Id, NewPost, NewUser, Post, User};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, error, warn};
use url::Url;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
    notifier: Notifier,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<Session>, notifier: Notifier) -> Self {
        Self::with_client(reqwest::Client::new(), config, session, notifier)
    }

    /// Reuse an existing [`reqwest::Client`] and its connection pool.
    pub fn with_client(
        http: reqwest::Client,
        config: &ClientConfig,
        session: Arc<Session>,
        notifier: Notifier,
    ) -> Self {
        Self {
            http,
            base_url: config.api_url.clone(),
            session,
            notifier,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// `POST /login`. A 401 here means bad credentials, not an expired
    /// session, so it bypasses the session-expiry handling.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("login")?)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(ClientError::InvalidCredentials),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(server_error(status, response).await),
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn users(&self) -> Result<Vec<User>, ClientError> {
        self.fetch(self.http.get(self.url("users")?)).await
    }

    pub async fn users_by_email(&self, email: &str) -> Result<Vec<User>, ClientError> {
        let request = self.http.get(self.url("users")?).query(&[("email", email)]);
        self.fetch(request).await
    }

    pub async fn user(&self, id: &Id) -> Result<User, ClientError> {
        self.fetch(self.http.get(self.url(&format!("users/{id}"))?))
            .await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ClientError> {
        self.fetch(self.http.post(self.url("users")?).json(user)).await
    }

    pub async fn replace_user(&self, user: &User) -> Result<User, ClientError> {
        let request = self
            .http
            .put(self.url(&format!("users/{}", user.id))?)
            .json(user);
        self.fetch(request).await
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    pub async fn posts(&self) -> Result<Vec<Post>, ClientError> {
        self.fetch(self.http.get(self.url("posts")?)).await
    }

    pub async fn posts_by_author(&self, user_id: &Id) -> Result<Vec<Post>, ClientError> {
        let request = self
            .http
            .get(self.url("posts")?)
            .query(&[("userId", user_id.as_str())]);
        self.fetch(request).await
    }

    pub async fn post(&self, id: &Id) -> Result<Post, ClientError> {
        self.fetch(self.http.get(self.url(&format!("posts/{id}"))?))
            .await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ClientError> {
        self.fetch(self.http.post(self.url("posts")?).json(post)).await
    }

    /// Full-document replace; whatever the server held is overwritten.
    pub async fn replace_post(&self, post: &Post) -> Result<Post, ClientError> {
        let request = self
            .http
            .put(self.url(&format!("posts/{}", post.id))?)
            .json(post);
        self.fetch(request).await
    }

    pub async fn delete_post(&self, id: &Id) -> Result<(), ClientError> {
        self.execute(self.http.delete(self.url(&format!("posts/{id}"))?))
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let request = match self.session.token()? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.inspect_err(|e| {
            warn!("request failed: {}", e);
        })?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());

        match status {
            s if s.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => {
                self.expire_session();
                Err(ClientError::SessionExpired)
            }
            StatusCode::NOT_FOUND => Err(ClientError::NotFound),
            s => Err(server_error(s, response).await),
        }
    }

    fn expire_session(&self) {
        if let Err(e) = self.session.expire() {
            error!("failed to clear expired session: {}", e);
        }
        self.notifier.navigate(LOGIN_PATH);
        self.notifier
            .error(ClientError::SessionExpired.toast_message());
    }
}

/// Prefer the collaborator's `{ "error": ... }` body, fall back to raw text.
async fn server_error(status: StatusCode, response: Response) -> ClientError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
        .unwrap_or(body);

    warn!("server error {}: {}", status.as_u16(), message);
    ClientError::Server {
        status: status.as_u16(),
        message,
    }
}
