use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::Id;
use std::{convert::Infallible, fmt, str::FromStr};

/// Account role. Only `admin` (any case) grants anything; unknown values
/// are kept verbatim and treated like a plain user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    User,
    Admin,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Role::User,
            "admin" => Role::Admin,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::from(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Other(raw) => raw,
        })
    }
}

/// A registered account.
///
/// `password` travels in plaintext: the collaborator stores and compares it
/// as-is. Never reuse this shape against a real backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Body of `POST /users`. The collaborator fills in `id`, and defaults
/// `role` and `createdAt` when they are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" USER ".parse::<Role>().unwrap(), Role::User);
        assert_eq!("root".parse::<Role>().unwrap(), Role::Other("root".into()));
    }

    #[test]
    fn unknown_role_still_decodes_as_non_admin() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 7,
            "username": "ed",
            "email": "ed@example.com",
            "role": "editor",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert!(!user.is_admin());
        assert_eq!(user.id.as_str(), "7");
        assert_eq!(serde_json::to_value(&user.role).unwrap(), "editor");
    }

    #[test]
    fn user_reads_camel_case_and_defaults_role() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "1",
            "username": "zag",
            "email": "zag@example.com",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(user.role, Role::User);
        assert!(!user.is_admin());
        assert!(user.updated_at.is_none());
    }

    #[test]
    fn uppercase_admin_role_is_admin() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "8d7d0f3a-4a43-4b43-9a57-5f0b5c1c9d10",
            "username": "root",
            "email": "root@example.com",
            "role": "ADMIN",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert!(user.is_admin());
        assert_eq!(serde_json::to_value(user.role).unwrap(), "admin");
    }
}
