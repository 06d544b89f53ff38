use crate::{AppState, errors::ApiError};
use axum::http::{HeaderMap, header};
use blog_models::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Token handed out when no signing secret is configured. It is a marker,
/// not a credential: nothing checks it.
pub const PLACEHOLDER_TOKEN: &str = "fake-token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub email: String,
    pub exp: usize,
}

pub fn create_token(user: &User, secret: &str) -> Result<String, ApiError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| ApiError::InternalError("Failed to calculate expiration".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::InternalError(format!("Token Creation failed: {}", e)))
}

pub fn validate_token(headers: &HeaderMap, secret: &str) -> Result<Claims, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized)
}

/// Token returned from `POST /login`: a signed JWT in strict mode, the
/// placeholder otherwise.
pub fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    match state.jwt_secret.as_deref() {
        Some(secret) => create_token(user, secret),
        None => Ok(PLACEHOLDER_TOKEN.to_string()),
    }
}

/// Gate for mutating routes. Only strict mode (a configured secret) checks
/// anything; json-server compatibility mode lets every write through.
pub fn authorize_write(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if let Some(secret) = state.jwt_secret.as_deref() {
        validate_token(headers, secret)?;
    }
    Ok(())
}
