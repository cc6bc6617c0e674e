use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{Environment, NewUser, User, UserId, UserPatch, default_users};

pub mod capabilities;
pub mod migrator;
pub mod repositories;

pub use capabilities::{CredentialLookup, TokenLedger, UserDirectory, UserMaintenance, UserWriter};

/// Failures surfaced by the user store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A user is already using that credential")]
    CredentialTaken,

    #[error("Refusing to reseed users in environment '{0}'")]
    EnvironmentNotAllowed(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    environment: Environment,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:");
        if !path_str.starts_with(":memory:") {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self {
            conn,
            environment: Environment::default(),
        })
    }

    /// Sets the environment marker that gates destructive maintenance.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Populates an empty users table.
    ///
    /// The local environment gets the default seed set. Any other environment
    /// gets a single admin holding `admin_credential`, or stays empty when none
    /// is configured. A table that already has users is left alone.
    pub async fn bootstrap_users(
        &self,
        admin_credential: Option<&str>,
    ) -> Result<Vec<UserId>, StoreError> {
        let repo = self.user_repo();
        if repo.count().await? > 0 {
            return Ok(Vec::new());
        }

        let seed = if self.environment.is_local() {
            default_users()
        } else if let Some(credential) = admin_credential {
            vec![NewUser {
                display_name: "Admin".to_string(),
                credential: credential.to_string(),
                is_admin: true,
                tokens_remaining: 0,
            }]
        } else {
            warn!(
                environment = %self.environment,
                "Users table is empty and no bootstrap admin credential is configured"
            );
            return Ok(Vec::new());
        };

        let mut ids = Vec::with_capacity(seed.len());
        for user in &seed {
            ids.push(repo.insert(user).await?);
        }

        info!(environment = %self.environment, count = ids.len(), "Bootstrapped users");
        Ok(ids)
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }
}

#[async_trait]
impl CredentialLookup for Store {
    async fn find_by_credential(&self, credential: &str) -> Result<Option<User>, StoreError> {
        self.user_repo().get_by_credential(credential).await
    }
}

#[async_trait]
impl UserDirectory for Store {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.user_repo().get_by_id(id).await
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        self.user_repo().list_all().await
    }
}

#[async_trait]
impl UserWriter for Store {
    async fn insert(&self, user: &NewUser) -> Result<UserId, StoreError> {
        self.user_repo().insert(user).await
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<bool, StoreError> {
        self.user_repo().update(id, patch).await
    }
}

#[async_trait]
impl TokenLedger for Store {
    async fn consume_tokens(&self, id: UserId, cost: i64) -> Result<bool, StoreError> {
        self.user_repo().consume_tokens(id, cost).await
    }
}

#[async_trait]
impl UserMaintenance for Store {
    async fn drop_and_reseed(&self, seed: &[NewUser]) -> Result<Vec<UserId>, StoreError> {
        if !self.environment.is_local() {
            warn!(
                environment = %self.environment,
                "Rejected user reseed outside the local environment"
            );
            return Err(StoreError::EnvironmentNotAllowed(
                self.environment.to_string(),
            ));
        }

        let ids = self.user_repo().replace_all(seed).await?;
        info!(count = ids.len(), "Users table reseeded");
        Ok(ids)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Self::ping(self).await
    }
}
