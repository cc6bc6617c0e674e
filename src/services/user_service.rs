//! Domain service for user administration.
//!
//! Listing, creating and updating users is admin-only; reading a single user
//! is allowed to that user and to admins. Reseeding and the unauthenticated
//! debug listing only work in the local environment.

use thiserror::Error;

use crate::db::StoreError;
use crate::domain::{NewUser, User, UserId, UserPatch};
use crate::services::auth_service::AuthError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("A user is already using that credential")]
    CredentialTaken,

    #[error("Operation not allowed in environment '{0}'")]
    EnvironmentNotAllowed(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for UserError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CredentialTaken => Self::CredentialTaken,
            StoreError::EnvironmentNotAllowed(env) => Self::EnvironmentNotAllowed(env),
            other @ StoreError::Database(_) => Self::Store(other),
        }
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Checks that the store answers.
    async fn ping(&self) -> Result<(), UserError>;

    /// Replaces every user with the default seed set.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::EnvironmentNotAllowed`] outside the local
    /// environment; nothing is dropped in that case.
    async fn reset(&self) -> Result<Vec<UserId>, UserError>;

    /// Lists every user without any credential check. Local environment only.
    async fn list_debug(&self) -> Result<Vec<User>, UserError>;

    /// Lists every user. Admin only.
    async fn list(&self, credential: &str) -> Result<Vec<User>, UserError>;

    /// Reads one user. Allowed for admins and for the user themself.
    ///
    /// # Errors
    ///
    /// Permission is decided before the target is looked up, so a
    /// non-admin caller gets [`AuthError::NotCallerOrAdmin`] whether or not
    /// the target exists.
    async fn get(&self, credential: &str, id: &str) -> Result<User, UserError>;

    /// Creates a user. Admin only.
    async fn create(&self, credential: &str, user: NewUser) -> Result<UserId, UserError>;

    /// Applies a partial update and returns the updated user. Admin only.
    async fn update(&self, credential: &str, id: &str, patch: UserPatch)
    -> Result<User, UserError>;
}
