use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::Id;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Travel,
    Tech,
    Lifestyle,
    Food,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Travel,
        Category::Tech,
        Category::Lifestyle,
        Category::Food,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Travel => "Travel",
            Category::Tech => "Tech",
            Category::Lifestyle => "Lifestyle",
            Category::Food => "Food",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(pub String);

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category `{}`", self.0)
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// A comment embedded in its post. The author is always referenced by id
/// and resolved to a display name when rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub user_id: Id,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub category: Category,
    pub user_id: Id,
    #[serde(default)]
    pub likes: u64,
    /// Users who currently like the post; `likes` mirrors its length.
    #[serde(default)]
    pub likes_history: Vec<Id>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &Id) -> bool {
        self.likes_history.contains(user_id)
    }

    /// Case-insensitive substring match over title and description.
    /// `needle` must already be lowercase.
    pub fn mentions(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Body of `POST /posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_ignoring_case() {
        assert_eq!("tech".parse::<Category>().unwrap(), Category::Tech);
        assert_eq!("Food".parse::<Category>().unwrap(), Category::Food);
        assert!("Sports".parse::<Category>().is_err());
    }

    #[test]
    fn post_without_like_history_deserializes_empty() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "id": "0b7f4a43-97c6-4f0e-8a9d-3f3ab6a0b001",
            "title": "Kyoto in spring",
            "description": "Temples and tea",
            "category": "Travel",
            "userId": "8d7d0f3a-4a43-4b43-9a57-5f0b5c1c9d10",
            "likes": 3,
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert!(post.likes_history.is_empty());
        assert!(post.comments.is_empty());
        assert_eq!(post.image_url, "");
    }

    #[test]
    fn numeric_ids_from_the_collaborator_decode() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Kyoto in spring",
            "description": "Temples and tea",
            "category": "Travel",
            "userId": 2,
            "likes": 1,
            "likesHistory": ["2"],
            "comments": [{
                "id": "1718000000000",
                "userId": 2,
                "text": "Lovely",
                "createdAt": "2024-05-02T10:00:00Z"
            }],
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(post.id, Id::from(1_u64));
        assert!(post.is_liked_by(&Id::from("2")));
        assert_eq!(post.comments[0].user_id, post.user_id);
    }

    #[test]
    fn mentions_matches_title_or_description() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "id": "0b7f4a43-97c6-4f0e-8a9d-3f3ab6a0b001",
            "title": "Rust Borrowing",
            "description": "Lifetimes explained",
            "category": "Tech",
            "userId": "8d7d0f3a-4a43-4b43-9a57-5f0b5c1c9d10",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert!(post.mentions("borrow"));
        assert!(post.mentions("lifetimes"));
        assert!(post.mentions(""));
        assert!(!post.mentions("python"));
    }
}
