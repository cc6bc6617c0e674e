//! Domain service for caller authorization.
//!
//! Resolves the opaque credential carried on every request to a stored user
//! and answers the permission questions the API layer needs. Every check goes
//! through [`AuthService::resolve`], so a missing credential, an unknown
//! credential and a store failure are classified the same way everywhere.

use thiserror::Error;

use crate::db::StoreError;
use crate::domain::User;

/// Errors specific to authorization decisions.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The caller presented no credential at all.
    #[error("No credential on request")]
    NoCredential,

    /// A credential was presented but no user holds it.
    #[error("User could not be authenticated")]
    CallerUnknown,

    #[error("Requesting user is not an admin")]
    NotAdmin,

    #[error("Requesting user does not have access")]
    NotCallerOrAdmin,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Stable label for metrics and logs.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NoCredential => "no_credential",
            Self::CallerUnknown => "caller_unknown",
            Self::NotAdmin => "not_admin",
            Self::NotCallerOrAdmin => "not_caller_or_admin",
            Self::Store(_) => "store_error",
        }
    }
}

/// Domain service trait for authorization.
///
/// Implementations never mutate the store and never retry.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Resolves a credential to its user.
    ///
    /// # Errors
    ///
    /// [`AuthError::NoCredential`] for an empty credential,
    /// [`AuthError::CallerUnknown`] when nobody holds it and
    /// [`AuthError::Store`] for any other lookup failure.
    async fn resolve(&self, credential: &str) -> Result<User, AuthError>;

    /// Whether the caller is an admin.
    async fn is_admin(&self, credential: &str) -> Result<bool, AuthError>;

    /// Whether the caller is an admin or is the user identified by
    /// `target_id`. The target is compared as an opaque handle and is not
    /// looked up.
    async fn is_caller_or_admin(&self, credential: &str, target_id: &str)
    -> Result<bool, AuthError>;

    /// Whether the credential belongs to any user, admin or not.
    async fn is_authenticated(&self, credential: &str) -> Result<bool, AuthError>;

    /// Resolves the caller and requires the admin flag.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAdmin`] for a resolved non-admin caller.
    async fn require_admin(&self, credential: &str) -> Result<User, AuthError>;

    /// Resolves the caller and requires admin or self access to `target_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotCallerOrAdmin`] when neither holds.
    async fn require_caller_or_admin(
        &self,
        credential: &str,
        target_id: &str,
    ) -> Result<User, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_display() {
        assert_eq!(AuthError::NoCredential.to_string(), "No credential on request");
        assert_eq!(
            AuthError::CallerUnknown.to_string(),
            "User could not be authenticated"
        );
    }

    #[test]
    fn store_errors_convert() {
        let err: AuthError = StoreError::Database(sea_orm::DbErr::Custom("down".into())).into();
        assert!(matches!(err, AuthError::Store(_)));
        assert_eq!(err.reason(), "store_error");
    }
}
