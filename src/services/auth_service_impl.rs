//! Store-backed implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{Span, debug, error, info_span};

use crate::db::CredentialLookup;
use crate::domain::User;
use crate::services::auth_service::{AuthError, AuthService};

pub struct CredentialAuthService {
    lookup: Arc<dyn CredentialLookup>,
    span: Span,
}

impl CredentialAuthService {
    #[must_use]
    pub fn new(lookup: Arc<dyn CredentialLookup>) -> Self {
        Self::with_span(lookup, info_span!("auth"))
    }

    #[must_use]
    pub const fn with_span(lookup: Arc<dyn CredentialLookup>, span: Span) -> Self {
        Self { lookup, span }
    }
}

#[async_trait]
impl AuthService for CredentialAuthService {
    async fn resolve(&self, credential: &str) -> Result<User, AuthError> {
        if credential.is_empty() {
            debug!(parent: &self.span, "Request carried no credential");
            return Err(AuthError::NoCredential);
        }

        match self.lookup.find_by_credential(credential).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                debug!(parent: &self.span, "Credential did not match any user");
                Err(AuthError::CallerUnknown)
            }
            Err(e) => {
                error!(parent: &self.span, error = %e, "Credential lookup failed");
                Err(AuthError::Store(e))
            }
        }
    }

    async fn is_admin(&self, credential: &str) -> Result<bool, AuthError> {
        let user = self.resolve(credential).await?;
        Ok(user.is_admin)
    }

    // Admins can access any user
    async fn is_caller_or_admin(
        &self,
        credential: &str,
        target_id: &str,
    ) -> Result<bool, AuthError> {
        let user = self.resolve(credential).await?;
        Ok(user.is_admin || user.id.matches(target_id))
    }

    // Presence in the store is the whole proof of authentication
    async fn is_authenticated(&self, credential: &str) -> Result<bool, AuthError> {
        self.resolve(credential).await?;
        Ok(true)
    }

    async fn require_admin(&self, credential: &str) -> Result<User, AuthError> {
        let user = self.resolve(credential).await?;
        if user.is_admin {
            Ok(user)
        } else {
            debug!(parent: &self.span, user_id = %user.id, "Admin access denied");
            Err(AuthError::NotAdmin)
        }
    }

    async fn require_caller_or_admin(
        &self,
        credential: &str,
        target_id: &str,
    ) -> Result<User, AuthError> {
        let user = self.resolve(credential).await?;
        if user.is_admin || user.id.matches(target_id) {
            Ok(user)
        } else {
            debug!(parent: &self.span, user_id = %user.id, "Access to another user denied");
            Err(AuthError::NotCallerOrAdmin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemoryStore, admin_user, default_user, other_user};

    fn service(store: MemoryStore) -> CredentialAuthService {
        CredentialAuthService::with_span(Arc::new(store), Span::none())
    }

    fn seeded() -> CredentialAuthService {
        service(MemoryStore::with_users(vec![
            admin_user(),
            default_user(),
            other_user(),
        ]))
    }

    #[tokio::test]
    async fn resolve_returns_user_for_known_credential() {
        let auth = seeded();
        let user = auth.resolve("ADMIN").await.unwrap();
        assert!(user.is_admin);
        assert_eq!(user.tokens_remaining, 100);
    }

    #[tokio::test]
    async fn empty_credential_is_no_credential_for_every_check() {
        let auth = seeded();
        assert!(matches!(auth.resolve("").await, Err(AuthError::NoCredential)));
        assert!(matches!(auth.is_admin("").await, Err(AuthError::NoCredential)));
        assert!(matches!(
            auth.is_caller_or_admin("", "1").await,
            Err(AuthError::NoCredential)
        ));
        assert!(matches!(
            auth.is_authenticated("").await,
            Err(AuthError::NoCredential)
        ));
        assert!(matches!(
            auth.require_admin("").await,
            Err(AuthError::NoCredential)
        ));
    }

    #[tokio::test]
    async fn unknown_credential_is_caller_unknown_for_every_check() {
        let auth = seeded();
        assert!(matches!(
            auth.resolve("MISSING").await,
            Err(AuthError::CallerUnknown)
        ));
        assert!(matches!(
            auth.is_admin("MISSING").await,
            Err(AuthError::CallerUnknown)
        ));
        assert!(matches!(
            auth.is_caller_or_admin("MISSING", "1").await,
            Err(AuthError::CallerUnknown)
        ));
        assert!(matches!(
            auth.is_authenticated("MISSING").await,
            Err(AuthError::CallerUnknown)
        ));
    }

    #[tokio::test]
    async fn empty_credential_never_reaches_the_store() {
        let auth = service(MemoryStore::failing());
        assert!(matches!(auth.resolve("").await, Err(AuthError::NoCredential)));
    }

    #[tokio::test]
    async fn store_failures_propagate_unchanged() {
        let auth = service(MemoryStore::failing());
        assert!(matches!(auth.resolve("ADMIN").await, Err(AuthError::Store(_))));
        assert!(matches!(auth.is_admin("ADMIN").await, Err(AuthError::Store(_))));
        assert!(matches!(
            auth.is_caller_or_admin("ADMIN", "1").await,
            Err(AuthError::Store(_))
        ));
        assert!(matches!(
            auth.is_authenticated("ADMIN").await,
            Err(AuthError::Store(_))
        ));
    }

    #[tokio::test]
    async fn is_admin_reflects_flag() {
        let auth = seeded();
        assert!(auth.is_admin("ADMIN").await.unwrap());
        assert!(!auth.is_admin("DEFAULT").await.unwrap());
    }

    #[tokio::test]
    async fn admin_may_act_on_any_target() {
        let auth = seeded();
        for target in ["1", "2", "3", "999", "BAD", ""] {
            assert!(auth.is_caller_or_admin("ADMIN", target).await.unwrap());
        }
    }

    #[tokio::test]
    async fn non_admin_may_act_only_on_self() {
        let auth = seeded();
        let caller = default_user();
        assert!(
            auth.is_caller_or_admin("DEFAULT", &caller.id.to_string())
                .await
                .unwrap()
        );
        assert!(!auth.is_caller_or_admin("DEFAULT", "3").await.unwrap());
        assert!(!auth.is_caller_or_admin("DEFAULT", "1").await.unwrap());
        assert!(!auth.is_caller_or_admin("DEFAULT", "BAD").await.unwrap());
    }

    #[tokio::test]
    async fn is_authenticated_ignores_admin_flag() {
        let auth = seeded();
        assert!(auth.is_authenticated("ADMIN").await.unwrap());
        assert!(auth.is_authenticated("DEFAULT").await.unwrap());
        assert!(auth.is_authenticated("OTHER").await.unwrap());
    }

    #[tokio::test]
    async fn require_admin_classifies_non_admin() {
        let auth = seeded();
        assert_eq!(auth.require_admin("ADMIN").await.unwrap().id, admin_user().id);
        assert!(matches!(
            auth.require_admin("DEFAULT").await,
            Err(AuthError::NotAdmin)
        ));
    }

    #[tokio::test]
    async fn require_caller_or_admin_classifies_other_target() {
        let auth = seeded();
        let user = auth.require_caller_or_admin("DEFAULT", "2").await.unwrap();
        assert_eq!(user.id, default_user().id);
        assert!(matches!(
            auth.require_caller_or_admin("DEFAULT", "3").await,
            Err(AuthError::NotCallerOrAdmin)
        ));
        assert!(auth.require_caller_or_admin("ADMIN", "3").await.is_ok());
    }
}
