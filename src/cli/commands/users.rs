//! List users command handler

use crate::config::Config;
use crate::db::{Store, UserDirectory};

pub async fn cmd_list_users(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let users = store.list_all().await?;

    if users.is_empty() {
        println!("No users.");
        println!();
        println!("Seed the default users with: maas reset-db");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");
    println!("{:>4}  {:<28} {:>6} {:>10}", "ID", "Name", "Admin", "Tokens");

    for user in users {
        println!(
            "{:>4}  {:<28} {:>6} {:>10}",
            user.id,
            user.display_name,
            if user.is_admin { "yes" } else { "no" },
            user.tokens_remaining
        );
    }

    Ok(())
}
