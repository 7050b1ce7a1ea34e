//! Swapguard CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use swapguard::cli::{handle_error, load_config, Cli, Commands};
use swapguard::infrastructure::logging::{redact, LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    info!(
        hr_api = %config.hr_api.base_url,
        email = %config.hr_api.email,
        password = redact(&config.hr_api.password),
        narrative_enabled = config.narrative.enabled,
        narrative_api_key = redact(&config.narrative.api_key),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Validate(args) => {
            swapguard::cli::commands::validate::execute(args, &config, cli.json).await
        }
        Commands::Auth(args) => swapguard::cli::commands::auth::execute(args, &config, cli.json).await,
        Commands::Cache(args) => swapguard::cli::commands::cache::execute(args, &config, cli.json),
    }
}
