//! Response cache CLI commands.
//!
//! The cache lives in process memory, so these report on the cache of the
//! current invocation together with its configured limits.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::output::{output, table_with_header, CommandOutput};
use crate::domain::models::{CacheConfig, Config};
use crate::services::{CacheStats, SwapValidationService};

#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache counters and TTL settings
    Stats,
    /// Drop every cached entry
    Clear,
}

#[derive(Debug, Serialize)]
pub struct CacheStatsOutput {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub ttl_secs: CacheConfig,
}

impl CommandOutput for CacheStatsOutput {
    fn to_human(&self) -> String {
        let s = &self.stats;
        let mut table = table_with_header(&["Metric", "Value"]);
        table.add_row(vec!["Hits".to_string(), s.hits.to_string()]);
        table.add_row(vec!["Misses".to_string(), s.misses.to_string()]);
        table.add_row(vec!["Evictions".to_string(), s.evictions.to_string()]);
        table.add_row(vec!["Size".to_string(), format!("{} / {}", s.size, s.max_size)]);
        table.add_row(vec![
            "Hit rate".to_string(),
            format!("{:.2}%", s.hit_rate_percent),
        ]);

        let t = &self.ttl_secs;
        let mut ttls = table_with_header(&["Resource", "TTL (s)"]);
        ttls.add_row(vec!["employee".to_string(), t.employee_ttl_secs.to_string()]);
        ttls.add_row(vec!["shift".to_string(), t.shift_ttl_secs.to_string()]);
        ttls.add_row(vec![
            "availability".to_string(),
            t.availability_ttl_secs.to_string(),
        ]);
        ttls.add_row(vec!["fatigue".to_string(), t.fatigue_ttl_secs.to_string()]);
        ttls.add_row(vec!["default".to_string(), t.default_ttl_secs.to_string()]);

        format!("{table}\n\n{ttls}")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct CacheActionOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for CacheActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn cleared_message(cleared: usize) -> String {
    let noun = if cleared == 1 { "entry" } else { "entries" };
    format!("Cleared {cleared} cache {noun}")
}

pub fn execute(args: CacheArgs, config: &Config, json_mode: bool) -> Result<()> {
    let service = SwapValidationService::from_config(config)?;

    match args.command {
        CacheCommands::Stats => {
            let out = CacheStatsOutput {
                stats: service.cache_stats(),
                ttl_secs: config.cache.clone(),
            };
            output(&out, json_mode);
        }
        CacheCommands::Clear => {
            let cleared = service.cache_stats().size;
            service.clear_cache();
            let out = CacheActionOutput {
                success: true,
                message: cleared_message(cleared),
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
