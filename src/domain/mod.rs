//! Domain types for users, credentials and environments.
//!
//! The store, the authorization layer and the API all speak these types; the
//! `SeaORM` entity never leaves the `db` module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier of a user record, assigned by the store.
///
/// Authorization compares it against path segments as an opaque string
/// handle, so [`UserId::matches`] is the only comparison the decider uses.
///
/// # Examples
///
/// ```rust
/// use maas::domain::UserId;
///
/// let id = UserId::new(2);
/// assert!(id.matches("2"));
/// assert!(!id.matches("3"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Exact comparison with an untrusted handle taken from a request.
    #[must_use]
    pub fn matches(&self, handle: &str) -> bool {
        self.to_string() == handle
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i32>().map(Self::new)
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub credential: String,
    pub is_admin: bool,
    pub tokens_remaining: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields needed to insert a user; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub display_name: String,
    pub credential: String,
    pub is_admin: bool,
    pub tokens_remaining: i64,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    pub display_name: Option<String>,
    pub credential: Option<String>,
    pub is_admin: Option<bool>,
    pub tokens_remaining: Option<i64>,
}

impl UserPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.credential.is_none()
            && self.is_admin.is_none()
            && self.tokens_remaining.is_none()
    }
}

/// Deployment environment marker.
///
/// Only [`Environment::Local`] may run destructive maintenance such as a
/// reseed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    Local,
    #[default]
    Production,
    Other(String),
}

impl Environment {
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Environment {
    fn from(name: &str) -> Self {
        match name.trim() {
            "local" => Self::Local,
            "production" | "" => Self::Production,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for Environment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// The fixed user set written by a reseed and on an empty local database.
#[must_use]
pub fn default_users() -> Vec<NewUser> {
    vec![
        NewUser {
            display_name: "Adam Min".to_string(),
            credential: "Super-Secret-Password".to_string(),
            is_admin: true,
            tokens_remaining: 100,
        },
        NewUser {
            display_name: "Alice MemeMaster".to_string(),
            credential: "Alice-MemeMaster-Password".to_string(),
            is_admin: false,
            tokens_remaining: 1000,
        },
        NewUser {
            display_name: "No-Token Bob".to_string(),
            credential: "Bob-Password".to_string(),
            is_admin: false,
            tokens_remaining: 0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_matches_only_exact_handle() {
        let id = UserId::new(2);
        assert!(id.matches("2"));
        assert!(!id.matches("3"));
        assert!(!id.matches("02"));
        assert!(!id.matches(" 2"));
        assert!(!id.matches(""));
    }

    #[test]
    fn user_id_serializes_as_string_handle() {
        let id = UserId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"42\"");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn user_id_rejects_non_numeric_handle() {
        assert!("BAD".parse::<UserId>().is_err());
        assert_eq!("7".parse::<UserId>().unwrap(), UserId::new(7));
    }

    #[test]
    fn environment_parsing() {
        assert!(Environment::from("local").is_local());
        assert!(!Environment::from("staging").is_local());
        assert_eq!(Environment::from(""), Environment::Production);
        assert_eq!(Environment::from("staging").to_string(), "staging");
    }

    #[test]
    fn default_users_has_single_admin_and_unique_credentials() {
        let users = default_users();
        assert_eq!(users.iter().filter(|u| u.is_admin).count(), 1);

        let mut credentials: Vec<_> = users.iter().map(|u| u.credential.as_str()).collect();
        credentials.sort_unstable();
        credentials.dedup();
        assert_eq!(credentials.len(), users.len());
        assert!(users.iter().all(|u| u.tokens_remaining >= 0));
    }

    #[test]
    fn empty_patch_detection() {
        assert!(UserPatch::default().is_empty());
        let patch = UserPatch {
            is_admin: Some(true),
            ..UserPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
