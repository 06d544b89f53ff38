//! View-model for a single post: likes, comments and deletion, each
//! committed locally only after the collaborator has stored it.

use crate::{error::ClientError, http::ApiClient, list::author_name};
use blog_models::{Comment, Id, Post, User};
use chrono::Utc;
use tracing::{info, warn};

pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailState {
    Idle,
    Loading,
    Ready,
    /// The post could not be fetched; the view offers a way back.
    NotFound,
    /// The post was deleted from this view.
    Deleted,
}

pub struct DetailViewModel {
    api: ApiClient,
    item: Option<Post>,
    users: Vec<User>,
    state: DetailState,
}

impl DetailViewModel {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            item: None,
            users: Vec::new(),
            state: DetailState::Idle,
        }
    }

    pub fn item(&self) -> Option<&Post> {
        self.item.as_ref()
    }

    pub fn state(&self) -> DetailState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == DetailState::Loading
    }

    /// Whether the current user is in the post's like history. Follows
    /// logins and logouts that happen after the post was loaded.
    pub fn liked(&self) -> bool {
        match (&self.item, self.api.session().current_user()) {
            (Some(post), Some(user)) => post.is_liked_by(&user.id),
            _ => false,
        }
    }

    pub fn author_name(&self, user_id: &Id) -> String {
        author_name(&self.users, user_id)
    }

    /// Fetch the post and the user list side by side. A missing user list
    /// only degrades author names; a missing post is terminal.
    pub async fn load(&mut self, id: &Id) -> Result<(), ClientError> {
        self.state = DetailState::Loading;

        let (post, users) = tokio::join!(self.api.post(id), self.api.users());

        self.users = users.unwrap_or_else(|e| {
            warn!("could not load users for post {}: {}", id, e);
            Vec::new()
        });

        match post {
            Ok(post) => {
                self.item = Some(post);
                self.state = DetailState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!("could not load post {}: {}", id, e);
                self.item = None;
                self.state = DetailState::NotFound;
                self.api.notifier().surface(&e);
                Err(e)
            }
        }
    }

    fn require_user(&self, action: &str) -> Result<User, ClientError> {
        self.api.session().current_user().ok_or_else(|| {
            self.api.notifier().error(format!("Please log in to {action}"));
            ClientError::Unauthenticated
        })
    }

    fn require_item(&self) -> Result<&Post, ClientError> {
        self.item.as_ref().ok_or(ClientError::NotFound)
    }

    fn fail<T>(&self, err: ClientError) -> Result<T, ClientError> {
        self.api.notifier().surface(&err);
        Err(err)
    }

    /// Write `updated` and adopt the stored copy. On failure nothing local
    /// changes.
    async fn commit(&mut self, updated: Post) -> Result<&Post, ClientError> {
        match self.api.replace_post(&updated).await {
            Ok(saved) => Ok(self.item.insert(saved)),
            Err(e) => {
                warn!("write of post {} failed: {}", updated.id, e);
                self.fail(e)
            }
        }
    }

    /// Like or unlike as the current user, keeping `likes` and
    /// `likesHistory` in step. The direction comes from the history itself,
    /// and `likes` only moves when the history does. Two calls in a row
    /// restore the original state.
    pub async fn toggle_like(&mut self) -> Result<bool, ClientError> {
        let user = self.require_user("like posts")?;
        let post = match self.require_item() {
            Ok(post) => post,
            Err(e) => return self.fail(e),
        };

        let liking = !post.is_liked_by(&user.id);
        let mut updated = post.clone();
        if liking {
            updated.likes_history.push(user.id.clone());
            updated.likes += 1;
        } else {
            let before = updated.likes_history.len();
            updated.likes_history.retain(|id| *id != user.id);
            let removed = (before - updated.likes_history.len()) as u64;
            updated.likes = updated.likes.saturating_sub(removed);
        }

        self.commit(updated).await?;
        Ok(liking)
    }

    pub async fn add_comment(&mut self, text: &str) -> Result<&Comment, ClientError> {
        let user = self.require_user("comment")?;
        let text = text.trim();
        if text.is_empty() {
            return self.fail(ClientError::Validation("Comment cannot be empty".into()));
        }
        let post = match self.require_item() {
            Ok(post) => post,
            Err(e) => return self.fail(e),
        };

        let comment = Comment {
            id: Id::generate(),
            user_id: user.id.clone(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        let comment_id = comment.id.clone();
        let mut updated = post.clone();
        updated.comments.push(comment);

        self.commit(updated).await?;
        self.api.notifier().success("Comment added successfully!");

        self.item
            .as_ref()
            .and_then(|post| post.comments.iter().find(|c| c.id == comment_id))
            .ok_or(ClientError::NotFound)
    }

    /// Only the comment's author may remove it.
    pub async fn delete_comment(&mut self, comment_id: &Id) -> Result<(), ClientError> {
        let user = self.require_user("delete comments")?;
        let post = match self.require_item() {
            Ok(post) => post,
            Err(e) => return self.fail(e),
        };

        let Some(comment) = post.comments.iter().find(|c| c.id == *comment_id) else {
            return self.fail(ClientError::NotFound);
        };
        if comment.user_id != user.id {
            return self.fail(ClientError::Unauthorized);
        }

        let mut updated = post.clone();
        updated.comments.retain(|c| c.id != *comment_id);

        self.commit(updated).await?;
        self.api.notifier().success("Comment deleted");
        Ok(())
    }

    /// Owner-only. On success the view is left without an item and the
    /// presentation layer is sent back home.
    pub async fn delete_post(&mut self) -> Result<(), ClientError> {
        let user = self.require_user("delete posts")?;
        let post = match self.require_item() {
            Ok(post) => post,
            Err(e) => return self.fail(e),
        };
        if post.user_id != user.id {
            return self.fail(ClientError::Unauthorized);
        }

        let id = post.id.clone();
        if let Err(e) = self.api.delete_post(&id).await {
            return self.fail(e);
        }

        info!("post {} deleted by {}", id, user.id);
        self.item = None;
        self.state = DetailState::Deleted;
        self.api.notifier().success("Post deleted successfully");
        self.api.notifier().navigate(HOME_PATH);
        Ok(())
    }
}
