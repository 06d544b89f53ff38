use crate::{
    AppState,
    auth::authorize_write,
    dto::{CreatePostRequest, PostQuery},
    errors::ApiError,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use blog_models::{Id, Post};
use chrono::Utc;
use tracing::info;
use validator::Validate;

/// POST /posts
/// Headers: Authorization: Bearer <token> (strict mode)
/// Body: { "title": "...", "description": "...", "category": "...", "userId": "..." }
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    payload.validate()?;
    authorize_write(&state, &headers)?;

    let created_at = payload.created_at.unwrap_or_else(Utc::now);
    let post = Post {
        id: Id::generate(),
        title: payload.title,
        description: payload.description,
        image_url: payload.image_url,
        category: payload.category,
        user_id: payload.user_id,
        likes: payload.likes,
        likes_history: payload.likes_history,
        comments: payload.comments,
        created_at,
        updated_at: payload.updated_at,
    };

    let post = state.db.insert_post(post).await?;

    info!("Post created: {} by user {}", post.id, post.user_id);

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts?userId=...
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PostQuery>,
) -> Json<Vec<Post>> {
    let author = params.user_id.map(Id::from);
    Json(state.db.posts(author.as_ref()))
}

/// GET /posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    state.db.post(&Id::from(id)).map(Json).ok_or(ApiError::NotFound)
}

/// PUT /posts/:id
/// Headers: Authorization: Bearer <token> (strict mode)
/// Body: the full post document; there is no partial update.
pub async fn update_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut payload): Json<Post>,
) -> Result<Json<Post>, ApiError> {
    authorize_write(&state, &headers)?;

    payload.id = Id::from(id);
    let post = state.db.replace_post(payload).await?;

    info!("Post replaced: {} (likes {})", post.id, post.likes);

    Ok(Json(post))
}

/// DELETE /posts/:id
/// Headers: Authorization: Bearer <token> (strict mode)
pub async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize_write(&state, &headers)?;

    let id = Id::from(id);
    state.db.delete_post(&id).await?;

    info!("Post deleted: {}", id);

    Ok(StatusCode::OK)
}
