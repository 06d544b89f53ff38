use blog_models::{Category, Comment, Id, Role};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Not validated: any mismatch, malformed email included, is a plain 401.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /users`. `role` and `createdAt` are filled in when the
/// client leaves them out.
#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub role: Option<Role>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub category: Category,
    pub user_id: Id,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub likes_history: Vec<Id>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// `GET /users?email=...`
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub email: Option<String>,
}

/// `GET /posts?userId=...`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    pub user_id: Option<String>,
}
