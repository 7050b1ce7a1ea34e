//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::auth::AuthArgs;
use super::commands::cache::CacheArgs;
use super::commands::validate::ValidateArgs;

#[derive(Parser, Debug)]
#[command(name = "swapguard")]
#[command(about = "Swapguard - shift swap validation", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .swapguard/
    #[arg(short, long, global = true, env = "SWAPGUARD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a shift swap against the HR system
    Validate(ValidateArgs),

    /// HR API credential commands
    Auth(AuthArgs),

    /// Response cache commands
    Cache(CacheArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::auth::AuthCommands;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::parse_from([
            "swapguard",
            "validate",
            "--swap-id",
            "7",
            "--requester-id",
            "1",
            "--requester-shift-id",
            "10",
            "--target-employee-id",
            "2",
            "--target-shift-id",
            "20",
            "--reason",
            "family event",
            "--json",
        ]);

        assert!(cli.json);
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate command");
        };
        let request = args.into_request();
        assert_eq!(request.swap_id, 7);
        assert_eq!(request.target_shift_id, 20);
        assert_eq!(request.swap_reason.as_deref(), Some("family event"));
    }

    #[test]
    fn test_parse_auth_refresh_with_config() {
        let cli = Cli::parse_from(["swapguard", "--config", "ops.yaml", "auth", "refresh"]);
        assert_eq!(cli.config, Some(PathBuf::from("ops.yaml")));
        assert!(matches!(
            cli.command,
            Commands::Auth(AuthArgs {
                command: AuthCommands::Refresh
            })
        ));
    }

    #[test]
    fn test_validate_requires_ids() {
        assert!(Cli::try_parse_from(["swapguard", "validate", "--swap-id", "1"]).is_err());
    }
}
