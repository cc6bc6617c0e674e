//! Store-backed implementation of the `UserService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{Span, info, info_span, warn};

use crate::db::{UserDirectory, UserMaintenance, UserWriter};
use crate::domain::{Environment, NewUser, User, UserId, UserPatch, default_users};
use crate::services::auth_service::AuthService;
use crate::services::user_service::{UserError, UserService};

pub struct StoreUserService {
    auth: Arc<dyn AuthService>,
    directory: Arc<dyn UserDirectory>,
    writer: Arc<dyn UserWriter>,
    maintenance: Arc<dyn UserMaintenance>,
    environment: Environment,
    span: Span,
}

impl StoreUserService {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthService>,
        directory: Arc<dyn UserDirectory>,
        writer: Arc<dyn UserWriter>,
        maintenance: Arc<dyn UserMaintenance>,
        environment: Environment,
    ) -> Self {
        Self {
            auth,
            directory,
            writer,
            maintenance,
            environment,
            span: info_span!("users"),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    fn parse_id(id: &str) -> Result<UserId, UserError> {
        id.parse().map_err(|_| UserError::NotFound(id.to_string()))
    }

    fn validate_credential(credential: &str) -> Result<(), UserError> {
        if credential.trim().is_empty() {
            return Err(UserError::Validation("Credential must not be empty".to_string()));
        }
        // Header parsing strips surrounding whitespace, so it could never be presented
        if credential.trim() != credential {
            return Err(UserError::Validation(
                "Credential must not start or end with whitespace".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_tokens(tokens: i64) -> Result<(), UserError> {
        if tokens < 0 {
            return Err(UserError::Validation(
                "tokens_remaining must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_new_user(user: &NewUser) -> Result<(), UserError> {
        Self::validate_credential(&user.credential)?;
        Self::validate_tokens(user.tokens_remaining)
    }

    fn validate_patch(patch: &UserPatch) -> Result<(), UserError> {
        if let Some(credential) = &patch.credential {
            Self::validate_credential(credential)?;
        }
        if let Some(tokens) = patch.tokens_remaining {
            Self::validate_tokens(tokens)?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for StoreUserService {
    async fn ping(&self) -> Result<(), UserError> {
        self.maintenance.ping().await?;
        Ok(())
    }

    async fn reset(&self) -> Result<Vec<UserId>, UserError> {
        let ids = self.maintenance.drop_and_reseed(&default_users()).await?;
        info!(parent: &self.span, count = ids.len(), "Users reset to seed data");
        Ok(ids)
    }

    async fn list_debug(&self) -> Result<Vec<User>, UserError> {
        if !self.environment.is_local() {
            warn!(parent: &self.span, environment = %self.environment, "Debug user listing refused");
            return Err(UserError::EnvironmentNotAllowed(self.environment.to_string()));
        }
        Ok(self.directory.list_all().await?)
    }

    async fn list(&self, credential: &str) -> Result<Vec<User>, UserError> {
        self.auth.require_admin(credential).await?;
        Ok(self.directory.list_all().await?)
    }

    async fn get(&self, credential: &str, id: &str) -> Result<User, UserError> {
        self.auth.require_caller_or_admin(credential, id).await?;

        let user_id = Self::parse_id(id)?;
        self.directory
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn create(&self, credential: &str, user: NewUser) -> Result<UserId, UserError> {
        let admin = self.auth.require_admin(credential).await?;
        Self::validate_new_user(&user)?;

        let id = self.writer.insert(&user).await?;
        info!(parent: &self.span, admin_id = %admin.id, user_id = %id, "User created");
        Ok(id)
    }

    async fn update(
        &self,
        credential: &str,
        id: &str,
        patch: UserPatch,
    ) -> Result<User, UserError> {
        let admin = self.auth.require_admin(credential).await?;
        Self::validate_patch(&patch)?;

        let user_id = Self::parse_id(id)?;
        if !self.writer.update(user_id, &patch).await? {
            return Err(UserError::NotFound(id.to_string()));
        }

        info!(parent: &self.span, admin_id = %admin.id, user_id = %user_id, "User updated");

        self.directory
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}
