use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CredentialAuthService, MemeMaker, MemeService, MeteredMemeService,
    StoreUserService, TokenMeter, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub meme_service: Arc<dyn MemeService>,

    pub user_service: Arc<dyn UserService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?
        .with_environment(config.general.environment.clone());

        store
            .bootstrap_users(config.general.bootstrap_admin_credential.as_deref())
            .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires every service against an already connected store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let store_arc = Arc::new(store.clone());

        let auth_service = Arc::new(CredentialAuthService::new(store_arc.clone()))
            as Arc<dyn AuthService + Send + Sync + 'static>;

        let meter = TokenMeter::new(store_arc.clone(), config.metering.meme_cost);
        let meme_service = Arc::new(MeteredMemeService::new(
            auth_service.clone(),
            meter,
            Arc::new(MemeMaker),
        )) as Arc<dyn MemeService + Send + Sync + 'static>;

        let user_service = Arc::new(StoreUserService::new(
            auth_service,
            store_arc.clone(),
            store_arc.clone(),
            store_arc,
            config.general.environment.clone(),
        )) as Arc<dyn UserService + Send + Sync + 'static>;

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            meme_service,
            user_service,
        }
    }
}
