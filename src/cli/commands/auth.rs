//! HR API credential CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::hr_api::CredentialStatus;
use crate::services::SwapValidationService;

#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Show the state of the HR API credential
    Status,
    /// Discard the current credential and log in again
    Refresh,
}

#[derive(Debug, Serialize)]
pub struct AuthStatusOutput {
    #[serde(flatten)]
    pub status: CredentialStatus,
    pub message: String,
}

impl AuthStatusOutput {
    fn new(status: CredentialStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl CommandOutput for AuthStatusOutput {
    fn to_human(&self) -> String {
        let s = &self.status;
        let mut lines = vec![
            self.message.clone(),
            format!("Authenticated: {}", if s.authenticated { "yes" } else { "no" }),
            format!("Token valid:   {}", if s.valid { "yes" } else { "no" }),
        ];
        if let Some(expires_at) = s.expires_at {
            lines.push(format!(
                "Expires at:    {}",
                expires_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        if let Some(secs) = s.seconds_until_expiry {
            lines.push(format!("Expires in:    {}m {}s", secs / 60, secs % 60));
        }
        lines.push(format!(
            "Refresh token: {}",
            if s.has_refresh_token { "present" } else { "none" }
        ));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: AuthArgs, config: &Config, json_mode: bool) -> Result<()> {
    let service = SwapValidationService::connect(config).await?;

    let out = match args.command {
        AuthCommands::Status => {
            let status = service
                .credential_status()
                .await
                .context("No HR API credential manager configured")?;
            let message = if status.valid {
                "HR API credential is valid"
            } else {
                "HR API credential is missing or expired"
            };
            AuthStatusOutput::new(status, message)
        }
        AuthCommands::Refresh => {
            let status = service
                .force_reauthenticate()
                .await
                .context("Re-authentication with the HR API failed")?;
            AuthStatusOutput::new(status, "Re-authenticated with the HR API")
        }
    };

    output(&out, json_mode);
    Ok(())
}
