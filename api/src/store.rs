use crate::errors::ApiError;
use blog_models::{Id, Post, User};
use dashmap::{DashMap, mapref::entry::Entry};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// On-disk layout of the database file: one array per collection.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DbFile {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// Document store behind the REST routes.
///
/// Every write replaces a whole document, so two clients racing on the same
/// post resolve as last-write-wins. When backed by a file the full snapshot
/// is rewritten after each mutation.
pub struct Db {
    users: DashMap<Id, User>,
    posts: DashMap<Id, Post>,
    email_index: DashMap<String, Id>, // Quick Lookup by Email
    path: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl Db {
    pub fn in_memory() -> Self {
        Self::from_snapshot(DbFile::default(), None)
    }

    /// Load `path` if it exists; a missing file starts an empty database
    /// that will be created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let path = path.into();
        let file = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                ApiError::InternalError(format!("Malformed database {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DbFile::default(),
            Err(e) => {
                return Err(ApiError::InternalError(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        info!(
            "Loaded {} users and {} posts from {}",
            file.users.len(),
            file.posts.len(),
            path.display()
        );

        Ok(Self::from_snapshot(file, Some(path)))
    }

    pub fn from_snapshot(file: DbFile, path: Option<PathBuf>) -> Self {
        let db = Self {
            users: DashMap::new(),
            posts: DashMap::new(),
            email_index: DashMap::new(),
            path,
            write_lock: Mutex::new(()),
        };

        for user in file.users {
            db.email_index.insert(user.email.to_lowercase(), user.id.clone());
            db.users.insert(user.id.clone(), user);
        }
        for post in file.posts {
            db.posts.insert(post.id.clone(), post);
        }

        db
    }

    pub fn snapshot(&self) -> DbFile {
        DbFile {
            users: self.users(None),
            posts: self.posts(None),
        }
    }

    async fn persist(&self) -> Result<(), ApiError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        // Snapshot under the lock so the last writer always flushes the
        // latest state.
        let _guard = self.write_lock.lock().await;
        let bytes = serde_json::to_vec_pretty(&self.snapshot())
            .map_err(|e| ApiError::InternalError(format!("Serialization failed: {}", e)))?;
        tokio::fs::write(path, bytes).await.map_err(|e| {
            ApiError::InternalError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        debug!("Database flushed to {}", path.display());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// All users ordered by creation, optionally narrowed to one email.
    pub fn users(&self, email: Option<&str>) -> Vec<User> {
        let email = email.map(str::to_lowercase);
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|entry| {
                email
                    .as_deref()
                    .is_none_or(|e| entry.value().email.to_lowercase() == e)
            })
            .map(|entry| entry.value().clone())
            .collect();

        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        users
    }

    pub fn user(&self, id: &Id) -> Option<User> {
        self.users.get(id).map(|u| u.clone())
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let id = self.email_index.get(&email.to_lowercase())?.clone();
        self.user(&id)
    }

    pub async fn insert_user(&self, user: User) -> Result<User, ApiError> {
        match self.email_index.entry(user.email.to_lowercase()) {
            Entry::Occupied(_) => {
                return Err(ApiError::Conflict("Email already registered".into()));
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
            }
        }
        self.users.insert(user.id.clone(), user.clone());
        self.persist().await?;

        Ok(user)
    }

    pub async fn replace_user(&self, user: User) -> Result<User, ApiError> {
        let previous = self.user(&user.id).ok_or(ApiError::NotFound)?;
        let old_email = previous.email.to_lowercase();
        let new_email = user.email.to_lowercase();

        if old_email != new_email {
            match self.email_index.entry(new_email) {
                Entry::Occupied(_) => {
                    return Err(ApiError::Conflict("Email already registered".into()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(user.id.clone());
                }
            }
            self.email_index.remove(&old_email);
        }

        self.users.insert(user.id.clone(), user.clone());
        self.persist().await?;

        Ok(user)
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    /// All posts ordered by creation, optionally narrowed to one author.
    pub fn posts(&self, user_id: Option<&Id>) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| user_id.is_none_or(|id| entry.value().user_id == *id))
            .map(|entry| entry.value().clone())
            .collect();

        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        posts
    }

    pub fn post(&self, id: &Id) -> Option<Post> {
        self.posts.get(id).map(|p| p.clone())
    }

    pub async fn insert_post(&self, post: Post) -> Result<Post, ApiError> {
        self.posts.insert(post.id.clone(), post.clone());
        self.persist().await?;

        Ok(post)
    }

    pub async fn replace_post(&self, post: Post) -> Result<Post, ApiError> {
        if !self.posts.contains_key(&post.id) {
            return Err(ApiError::NotFound);
        }
        self.posts.insert(post.id.clone(), post.clone());
        self.persist().await?;

        Ok(post)
    }

    pub async fn delete_post(&self, id: &Id) -> Result<(), ApiError> {
        self.posts.remove(id).ok_or(ApiError::NotFound)?;
        self.persist().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_models::{Category, Role};
    use chrono::{Duration, Utc};

    fn user(email: &str) -> User {
        User {
            id: Id::generate(),
            username: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            password: "secret1".into(),
            role: Role::User,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn post(user_id: Id, age_minutes: i64) -> Post {
        Post {
            id: Id::generate(),
            title: "Title".into(),
            description: "Description".into(),
            image_url: String::new(),
            category: Category::Tech,
            user_id,
            likes: 0,
            likes_history: vec![],
            comments: vec![],
            created_at: Utc::now() - Duration::minutes(age_minutes),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict_regardless_of_case() {
        let db = Db::in_memory();
        db.insert_user(user("a@x.com")).await.unwrap();

        let err = db.insert_user(user("A@X.com")).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(db.users(None).len(), 1);
    }

    #[tokio::test]
    async fn changing_email_moves_the_index() {
        let db = Db::in_memory();
        let mut alice = db.insert_user(user("alice@x.com")).await.unwrap();

        alice.email = "alice@y.com".into();
        db.replace_user(alice.clone()).await.unwrap();

        assert!(db.user_by_email("alice@x.com").is_none());
        assert_eq!(db.user_by_email("ALICE@y.com").unwrap().id, alice.id);
    }

    #[tokio::test]
    async fn posts_come_back_oldest_first_and_filter_by_author() {
        let db = Db::in_memory();
        let (a, b) = (Id::from(1_u64), Id::from(2_u64));
        let newer = db.insert_post(post(a.clone(), 1)).await.unwrap();
        let older = db.insert_post(post(a.clone(), 10)).await.unwrap();
        db.insert_post(post(b, 5)).await.unwrap();

        let mine: Vec<Id> = db.posts(Some(&a)).into_iter().map(|p| p.id).collect();
        assert_eq!(mine, vec![older.id, newer.id]);
        assert_eq!(db.posts(None).len(), 3);
    }

    #[tokio::test]
    async fn replacing_a_missing_post_is_not_found() {
        let db = Db::in_memory();
        let err = db.replace_post(post(Id::generate(), 0)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn file_backed_db_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let db = Db::open(&path).unwrap();
        let alice = db.insert_user(user("alice@x.com")).await.unwrap();
        db.insert_post(post(alice.id.clone(), 0)).await.unwrap();
        drop(db);

        let reopened = Db::open(&path).unwrap();
        assert_eq!(reopened.user_by_email("alice@x.com").unwrap().id, alice.id);
        assert_eq!(reopened.posts(Some(&alice.id)).len(), 1);
    }
}
