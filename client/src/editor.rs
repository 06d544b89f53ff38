//! Create and edit posts.

use crate::{detail::HOME_PATH, error::ClientError, http::ApiClient};
use blog_models::{Category, Id, NewPost, Post, User};
use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct PostDraft {
    #[validate(length(min = 3, max = 100, message = "Title must be 3-100 characters"))]
    pub title: String,
    #[validate(length(min = 10, message = "Description too short"))]
    pub description: String,
    #[validate(url(message = "A valid image URL is required"))]
    pub image_url: String,
    pub category: Category,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            image_url: String::new(),
            category: Category::Travel,
        }
    }
}

impl From<&Post> for PostDraft {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            description: post.description.clone(),
            image_url: post.image_url.clone(),
            category: post.category,
        }
    }
}

pub struct PostEditor {
    api: ApiClient,
    author: User,
    /// The stored post when editing; its likes and comments are carried
    /// over untouched on save.
    original: Option<Post>,
    pub draft: PostDraft,
}

impl PostEditor {
    fn require_user(api: &ApiClient) -> Result<User, ClientError> {
        api.session().current_user().ok_or_else(|| {
            api.notifier().error("Please log in to access this page!");
            api.notifier().navigate(crate::http::LOGIN_PATH);
            ClientError::Unauthenticated
        })
    }

    pub fn create(api: ApiClient) -> Result<Self, ClientError> {
        let author = Self::require_user(&api)?;
        Ok(Self {
            api,
            author,
            original: None,
            draft: PostDraft::default(),
        })
    }

    /// Open an existing post for editing. Only its owner may do so; anyone
    /// else is sent home.
    pub async fn edit(api: ApiClient, id: &Id) -> Result<Self, ClientError> {
        let author = Self::require_user(&api)?;

        let post = match api.post(id).await {
            Ok(post) => post,
            Err(e) => {
                warn!("could not open post {} for editing: {}", id, e);
                api.notifier().surface(&e);
                api.notifier().navigate(HOME_PATH);
                return Err(e);
            }
        };

        if post.user_id != author.id {
            api.notifier().error("You can only edit your own posts!");
            api.notifier().navigate(HOME_PATH);
            return Err(ClientError::Unauthorized);
        }

        Ok(Self {
            api,
            author,
            draft: PostDraft::from(&post),
            original: Some(post),
        })
    }

    pub fn is_editing(&self) -> bool {
        self.original.is_some()
    }

    pub async fn submit(&self) -> Result<Post, ClientError> {
        if let Err(e) = self.draft.validate() {
            let err = ClientError::from(e);
            self.api.notifier().surface(&err);
            return Err(err);
        }

        let now = Utc::now();
        let draft = self.draft.clone();
        let result = match &self.original {
            Some(original) => {
                let post = Post {
                    title: draft.title,
                    description: draft.description,
                    image_url: draft.image_url,
                    category: draft.category,
                    updated_at: Some(now),
                    ..original.clone()
                };
                self.api.replace_post(&post).await
            }
            None => {
                let post = NewPost {
                    title: draft.title,
                    description: draft.description,
                    image_url: draft.image_url,
                    category: draft.category,
                    user_id: self.author.id.clone(),
                    likes: 0,
                    likes_history: Vec::new(),
                    comments: Vec::new(),
                    created_at: Some(now),
                    updated_at: Some(now),
                };
                self.api.create_post(&post).await
            }
        };

        match result {
            Ok(post) => {
                let verb = if self.is_editing() { "updated" } else { "created" };
                info!("post {} {}", post.id, verb);
                self.api
                    .notifier()
                    .success(format!("Post {verb} successfully!"));
                self.api.notifier().navigate(HOME_PATH);
                Ok(post)
            }
            Err(e) => {
                self.api.notifier().surface(&e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_validation() {
        let mut draft = PostDraft {
            title: "Kyoto".into(),
            description: "Temples, tea and trains".into(),
            image_url: "https://img.example.com/kyoto.png".into(),
            category: Category::Travel,
        };
        assert!(draft.validate().is_ok());

        draft.image_url = String::new();
        assert!(draft.validate().is_err());

        draft.image_url = "https://img.example.com/kyoto.png".into();
        draft.title = "Ky".into();
        assert!(draft.validate().is_err());

        draft.title = "Kyoto".into();
        draft.description = "short".into();
        assert!(draft.validate().is_err());
    }
}
