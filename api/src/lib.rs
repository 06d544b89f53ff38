// ============================================================================
// BLOG COLLABORATOR - json-server compatible REST API
// ============================================================================

// - Users and posts stored as whole JSON documents
// - POST /login with plaintext credentials (development only)
// - Optional strict mode: signed tokens required for writes
// - Permissive CORS for the browser front-end
// - Write-through persistence to a single JSON file

pub mod auth;
pub mod config;
pub mod dto;
pub mod errors;
pub mod routes;
pub mod states;
pub mod store;

pub use config::Config;
pub use errors::ApiError;
pub use states::AppState;
pub use store::{Db, DbFile};

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use routes::{
    health::health_check,
    post::{create_post, delete_post, get_post, list_posts, update_post},
    user::{create_user, get_user, list_users, login, update_user},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the router with its middleware stack. Shared by the binary and by
/// tests so both see the same CORS and tracing behaviour.
pub fn app(state: AppState) -> Router {
    // Preflight OPTIONS requests are answered here with 200.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_check))
        .route("/login", post(login))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user))
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
