//! CLI module - Command-line interface for maas
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// maas - metered meme generation service
#[derive(Parser)]
#[command(name = "maas")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Drop every user and write the seed set (local environment only)
    ResetDb,

    /// Print all users as a table
    #[command(alias = "ls")]
    Users,

    /// Create default config file
    Init,
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["maas"]).unwrap();
        assert_eq!(cli.command.unwrap_or(Commands::Serve), Commands::Serve);
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["maas", "reset-db"]).unwrap();
        assert_eq!(cli.command, Some(Commands::ResetDb));

        let cli = Cli::try_parse_from(["maas", "ls"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Users));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["maas", "frobnicate"]).is_err());
    }
}
