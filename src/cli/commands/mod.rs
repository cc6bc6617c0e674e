mod reset_db;
mod users;

pub use reset_db::cmd_reset_db;
pub use users::cmd_list_users;
