//! `swapguard validate`

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color};
use serde::Serialize;

use crate::cli::output::{output, table_with_header, truncate, CommandOutput};
use crate::domain::models::{Config, Decision, SwapValidationRequest, SwapValidationResponse};
use crate::services::{CacheStats, SwapValidationService};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[arg(long)]
    pub swap_id: i64,

    #[arg(long)]
    pub requester_id: i64,

    #[arg(long)]
    pub requester_shift_id: i64,

    #[arg(long)]
    pub target_employee_id: i64,

    #[arg(long)]
    pub target_shift_id: i64,

    /// Free-text reason given by the requester
    #[arg(long)]
    pub reason: Option<String>,

    /// Append response cache statistics to the output
    #[arg(long)]
    pub cache_stats: bool,
}

impl ValidateArgs {
    pub fn into_request(self) -> SwapValidationRequest {
        SwapValidationRequest {
            swap_id: self.swap_id,
            requester_id: self.requester_id,
            requester_shift_id: self.requester_shift_id,
            target_employee_id: self.target_employee_id,
            target_shift_id: self.target_shift_id,
            swap_reason: self.reason,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    #[serde(flatten)]
    pub response: SwapValidationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

fn decision_color(decision: Decision) -> Color {
    match decision {
        Decision::AutoApprove => Color::Green,
        Decision::AutoReject => Color::Red,
        Decision::RequiresReview => Color::Yellow,
    }
}

impl CommandOutput for ValidateOutput {
    fn to_human(&self) -> String {
        let r = &self.response;
        let mut lines = vec![
            format!(
                "Swap #{}: {} (confidence {:.2})",
                r.swap_id, r.decision, r.confidence
            ),
            format!("Correlation ID: {}", r.correlation_id),
            format!("Processing time: {} ms", r.processing_time_ms),
            String::new(),
            r.reasoning.clone(),
        ];

        if !r.checks.is_empty() {
            let mut table = table_with_header(&["Check", "Result", "Severity", "Message"]);
            for check in &r.checks {
                let (label, color) = if check.passed {
                    ("pass", Color::Green)
                } else {
                    ("fail", decision_color(if check.is_hard_failure() {
                        Decision::AutoReject
                    } else {
                        Decision::RequiresReview
                    }))
                };
                table.add_row(vec![
                    Cell::new(check.check_name.as_str()),
                    Cell::new(label).fg(color),
                    Cell::new(check.severity.as_str()),
                    Cell::new(truncate(&check.message, 80)),
                ]);
            }
            lines.push(String::new());
            lines.push(table.to_string());
        }

        if !r.risk_factors.is_empty() {
            lines.push("\nRisk factors:".to_string());
            lines.extend(r.risk_factors.iter().map(|f| format!("  - {f}")));
        }

        if !r.suggestions.is_empty() {
            lines.push("\nSuggestions:".to_string());
            lines.extend(
                r.suggestions
                    .iter()
                    .map(|s| format!("  - [{}] {}", s.kind, s.message)),
            );
        }

        if let Some(stats) = &self.cache {
            lines.push(format!(
                "\nCache: {} hits, {} misses, {} entries ({:.1}% hit rate)",
                stats.hits, stats.misses, stats.size, stats.hit_rate_percent
            ));
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ValidateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let service = SwapValidationService::connect(config).await?;
    let show_cache = args.cache_stats;

    let response = service.validate(args.into_request()).await;

    let out = ValidateOutput {
        response,
        cache: show_cache.then(|| service.cache_stats()),
    };
    output(&out, json_mode);
    Ok(())
}
