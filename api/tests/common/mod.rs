#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header};
use blog_api::{AppState, Db, app};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret";

/// Router over an empty in-memory database, json-server compatible mode.
pub fn build_test_app() -> Router {
    app(AppState::new(Db::in_memory(), None))
}

/// Router that issues and checks signed tokens.
pub fn build_strict_app() -> Router {
    app(AppState::new(Db::in_memory(), Some(TEST_SECRET.to_string())))
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a user through the API and return the stored document.
pub async fn signup(app: &Router, username: &str, email: &str, password: &str) -> Value {
    let response = post_json(
        app,
        "/users",
        serde_json::json!({ "username": username, "email": email, "password": password }),
    )
    .await;
    body_json(response).await
}

pub fn new_post_body(user_id: &str, title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "description": "A description long enough",
        "imageUrl": "https://img.example.com/1.png",
        "category": "Tech",
        "userId": user_id
    })
}
