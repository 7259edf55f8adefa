//! CLI module - Command-line interface for the Codestack API server
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Codestack - course catalog API server
#[derive(Parser)]
#[command(name = "codestack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (overrides the default search locations)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Create an ADMIN account
    CreateAdmin {
        /// Login email of the new admin
        #[arg(long)]
        email: String,

        /// Display name of the new admin
        #[arg(long)]
        full_name: String,

        /// Password; prompted on stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Create default config file
    Init,
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_admin() {
        let cli = Cli::try_parse_from([
            "codestack",
            "create-admin",
            "--email",
            "root@example.com",
            "--full-name",
            "Root",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::CreateAdmin {
                email,
                full_name,
                password,
            }) => {
                assert_eq!(email, "root@example.com");
                assert_eq!(full_name, "Root");
                assert!(password.is_none());
            }
            _ => panic!("expected create-admin"),
        }
    }

    #[test]
    fn serve_is_the_default_and_accepts_aliases() {
        let cli = Cli::try_parse_from(["codestack"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["codestack", "daemon", "--config", "alt.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
    }
}
