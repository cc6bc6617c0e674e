//! Narrow store capabilities, one per consumer.
//!
//! The authorization layer only needs [`CredentialLookup`], the token meter
//! only [`TokenLedger`], and user administration the remaining three. `Store`
//! implements all of them; tests substitute in-memory fakes.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::{NewUser, User, UserId, UserPatch};

#[async_trait]
pub trait CredentialLookup: Send + Sync {
    /// Exact-match lookup. `Ok(None)` means no user holds the credential.
    async fn find_by_credential(&self, credential: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
pub trait UserWriter: Send + Sync {
    /// Inserts a user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CredentialTaken`] when the credential is already
    /// held by another user.
    async fn insert(&self, user: &NewUser) -> Result<UserId, StoreError>;

    /// Applies a partial update; `Ok(false)` when the id does not exist.
    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Decrements the balance by `cost` only if it stays non-negative.
    ///
    /// Returns `Ok(false)` without mutating anything when the balance is too
    /// low (or the user vanished).
    async fn consume_tokens(&self, id: UserId, cost: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserMaintenance: Send + Sync {
    /// Replaces every user with `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EnvironmentNotAllowed`] outside the local
    /// environment, before anything is dropped.
    async fn drop_and_reseed(&self, seed: &[NewUser]) -> Result<Vec<UserId>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
