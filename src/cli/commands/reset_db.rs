//! Reseed users command handler

use crate::config::Config;
use crate::db::{Store, UserMaintenance};
use crate::domain::default_users;

pub async fn cmd_reset_db(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path)
        .await?
        .with_environment(config.general.environment.clone());

    let ids = store.drop_and_reseed(&default_users()).await?;

    println!("Users reset ({} seeded)", ids.len());
    Ok(())
}
