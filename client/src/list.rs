//! View-model shared by the Home, Categories and Profile screens: fetch a
//! post collection, narrow it with search and filters, reveal it page by
//! page, and apply likes and deletions once the collaborator confirms them.

use crate::{
    error::ClientError,
    http::ApiClient,
    share::{SharePlatform, ShareTarget, share_target},
};
use blog_models::{Category, Id, Post, User};
use std::cell::OnceCell;
use tracing::{info, warn};
use url::Url;

/// Distance from the bottom, in pixels, at which scrolling reveals the
/// next page.
pub const SCROLL_THRESHOLD_PX: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthorFilter {
    #[default]
    All,
    User(Id),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub category: CategoryFilter,
    pub author: AuthorFilter,
}

impl ListQuery {
    pub fn matches(&self, post: &Post) -> bool {
        let category = match self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => post.category == c,
        };
        let author = match &self.author {
            AuthorFilter::All => true,
            AuthorFilter::User(id) => post.user_id == *id,
        };

        category && author && post.mentions(&self.search.trim().to_lowercase())
    }
}

/// Items matching `query`, in their original order.
pub fn filter_posts<'a>(items: &'a [Post], query: &ListQuery) -> Vec<&'a Post> {
    items.iter().filter(|post| query.matches(post)).collect()
}

/// Username for `user_id`, or a `User <id>` placeholder when unknown.
pub fn author_name(users: &[User], user_id: &Id) -> String {
    users
        .iter()
        .find(|u| u.id == *user_id)
        .map(|u| u.username.clone())
        .unwrap_or_else(|| format!("User {user_id}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    AllPosts,
    ByAuthor(Id),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub offset: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl ScrollPosition {
    pub fn near_bottom(&self) -> bool {
        self.offset + self.viewport_height >= self.content_height - SCROLL_THRESHOLD_PX
    }
}

pub struct ListViewModel {
    api: ApiClient,
    site_url: Url,
    source: ListSource,
    with_authors: bool,
    items: Vec<Post>,
    users: Vec<User>,
    state: LoadState,
    query: ListQuery,
    page: usize,
    page_size: usize,
    /// Indices into `items` that pass `query`; cleared on any change.
    filtered: OnceCell<Vec<usize>>,
}

impl ListViewModel {
    pub fn new(api: ApiClient, site_url: Url, source: ListSource, page_size: usize) -> Self {
        Self {
            api,
            site_url,
            source,
            with_authors: false,
            items: Vec::new(),
            users: Vec::new(),
            state: LoadState::Idle,
            query: ListQuery::default(),
            page: 1,
            page_size: page_size.max(1),
            filtered: OnceCell::new(),
        }
    }

    /// Also fetch the user collection on load so author names resolve.
    pub fn with_authors(mut self) -> Self {
        self.with_authors = true;
        self
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Fetch the collection (and users, when requested) concurrently. A
    /// failure is terminal for this view-model until `load` is called again.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.state = LoadState::Loading;

        let api = &self.api;
        let (source, with_authors) = (&self.source, self.with_authors);
        let posts = async move {
            match source {
                ListSource::AllPosts => api.posts().await,
                ListSource::ByAuthor(id) => api.posts_by_author(id).await,
            }
        };
        let users = async move {
            if with_authors {
                api.users().await
            } else {
                Ok(Vec::new())
            }
        };

        let result = tokio::try_join!(posts, users);
        match result {
            Ok((posts, users)) => {
                info!("loaded {} posts", posts.len());
                self.items = posts;
                self.users = users;
                self.state = LoadState::Loaded;
                self.invalidate();
                self.page = self.page.min(self.total_pages());
                Ok(())
            }
            Err(e) => {
                warn!("failed to load posts: {}", e);
                self.state = LoadState::Failed(e.toast_message());
                self.api.notifier().surface(&e);
                Err(e)
            }
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn items(&self) -> &[Post] {
        &self.items
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn author_name(&self, user_id: &Id) -> String {
        author_name(&self.users, user_id)
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
        self.query_changed();
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.query.category = category;
        self.query_changed();
    }

    pub fn set_author(&mut self, author: AuthorFilter) {
        self.query.author = author;
        self.query_changed();
    }

    fn query_changed(&mut self) {
        self.invalidate();
        self.page = 1;
    }

    fn invalidate(&mut self) {
        self.filtered.take();
    }

    fn filtered_indices(&self) -> &[usize] {
        self.filtered.get_or_init(|| {
            self.items
                .iter()
                .enumerate()
                .filter(|(_, post)| self.query.matches(post))
                .map(|(i, _)| i)
                .collect()
        })
    }

    pub fn filtered(&self) -> Vec<&Post> {
        self.filtered_indices()
            .iter()
            .map(|&i| &self.items[i])
            .collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered_indices().len()
    }

    /// Filtered posts grouped under every category, empty groups included.
    pub fn by_category(&self) -> Vec<(Category, Vec<&Post>)> {
        let filtered = self.filtered();
        Category::ALL
            .into_iter()
            .map(|category| {
                let posts = filtered
                    .iter()
                    .copied()
                    .filter(|p| p.category == category)
                    .collect();
                (category, posts)
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.filtered_len().div_ceil(self.page_size).max(1)
    }

    /// Cumulative window: everything up to and including the current page.
    pub fn visible(&self) -> Vec<&Post> {
        let end = (self.page * self.page_size).min(self.filtered_len());
        self.filtered_indices()[..end]
            .iter()
            .map(|&i| &self.items[i])
            .collect()
    }

    pub fn has_more(&self) -> bool {
        self.page * self.page_size < self.filtered_len()
    }

    /// Reveal one more page. Returns `false` once everything is visible.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Jump to a page, clamped to the pages that exist.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    pub fn on_scroll(&mut self, position: ScrollPosition) -> bool {
        position.near_bottom() && self.load_more()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    fn require_user(&self) -> Result<User, ClientError> {
        self.api.session().current_user().ok_or_else(|| {
            self.api.notifier().error("Please log in to continue");
            ClientError::Unauthenticated
        })
    }

    fn fail<T>(&self, err: ClientError) -> Result<T, ClientError> {
        self.api.notifier().surface(&err);
        Err(err)
    }

    fn position(&self, id: &Id) -> Result<usize, ClientError> {
        self.items
            .iter()
            .position(|p| p.id == *id)
            .ok_or(ClientError::NotFound)
    }

    /// Like a post as the current user. The local copy changes only after
    /// the collaborator accepts the new document. Liking twice is a no-op.
    pub async fn like(&mut self, id: &Id) -> Result<Post, ClientError> {
        let user = self.require_user()?;
        let index = match self.position(id) {
            Ok(i) => i,
            Err(e) => return self.fail(e),
        };

        let current = &self.items[index];
        if current.is_liked_by(&user.id) {
            return Ok(current.clone());
        }

        let mut updated = current.clone();
        updated.likes += 1;
        updated.likes_history.push(user.id.clone());

        match self.api.replace_post(&updated).await {
            Ok(saved) => {
                self.items[index] = saved.clone();
                self.invalidate();
                Ok(saved)
            }
            Err(e) => {
                warn!("like on {} failed: {}", id, e);
                self.fail(e)
            }
        }
    }

    /// Delete a post the current user owns, or any post as an admin. If the
    /// current page ends up empty the view steps back one page.
    pub async fn remove(&mut self, id: &Id) -> Result<(), ClientError> {
        let user = self.require_user()?;
        let post = match self.position(id) {
            Ok(i) => &self.items[i],
            Err(e) => return self.fail(e),
        };

        if post.user_id != user.id && !self.api.session().is_admin() {
            warn!("{} may not delete post {}", user.id, id);
            return self.fail(ClientError::Unauthorized);
        }

        if let Err(e) = self.api.delete_post(id).await {
            return self.fail(e);
        }

        self.items.retain(|p| p.id != *id);
        self.invalidate();
        if self.page > 1 && self.filtered_len() <= (self.page - 1) * self.page_size {
            self.page -= 1;
        }

        info!("post {} deleted by {}", id, user.id);
        self.api.notifier().success("Post deleted successfully");
        Ok(())
    }

    pub fn share(&self, id: &Id, platform: SharePlatform) -> Result<ShareTarget, ClientError> {
        let post = &self.items[self.position(id)?];
        Ok(share_target(&self.site_url, post, platform)?)
    }
}
