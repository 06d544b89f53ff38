use crate::{
    AppState,
    auth::{authorize_write, issue_token},
    dto::{AuthResponse, CreateUserRequest, LoginRequest, UserQuery},
    errors::ApiError,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use blog_models::{Id, User};
use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

/// POST /login
/// Body: { "email": "...", "password": "..." }
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    // Emails are stored lowercase; passwords are compared verbatim.
    let user = state
        .db
        .user_by_email(&payload.email)
        .filter(|user| user.password == payload.password)
        .ok_or_else(|| {
            warn!("Rejected login for {}", payload.email);
            ApiError::InvalidCredentials
        })?;

    let token = issue_token(&state, &user)?;

    info!("User logged in: {}", user.email);

    Ok(Json(AuthResponse { user, token }))
}

/// GET /users?email=...
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Json<Vec<User>> {
    Json(state.db.users(params.email.as_deref()))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    state.db.user(&Id::from(id)).map(Json).ok_or(ApiError::NotFound)
}

/// POST /users
/// Body: { "username": "...", "email": "...", "password": "..." }
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    payload.validate()?;

    let user = User {
        id: Id::generate(),
        username: payload.username,
        email: payload.email.to_lowercase(),
        password: payload.password,
        role: payload.role.unwrap_or_default(),
        created_at: payload.created_at.unwrap_or_else(Utc::now),
        updated_at: None,
    };

    let user = state.db.insert_user(user).await?;

    info!("New user registered: {}", user.email);

    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /users/:id
/// Headers: Authorization: Bearer <token> (strict mode)
/// Body: the full user document
pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut payload): Json<User>,
) -> Result<Json<User>, ApiError> {
    authorize_write(&state, &headers)?;

    payload.id = Id::from(id);
    payload.email = payload.email.to_lowercase();
    let user = state.db.replace_user(payload).await?;

    info!("User updated: {}", user.id);

    Ok(Json(user))
}
