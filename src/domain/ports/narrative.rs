use async_trait::async_trait;

use crate::domain::errors::NarrativeError;
use crate::domain::models::{CheckResult, Decision};

/// Who swaps which shift.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapSummary {
    pub requester_name: String,
    /// Shift the requester gives away, e.g. "night shift on 2026-03-02".
    pub requester_shift: String,
    pub target_name: String,
    pub target_shift: String,
}

/// Facts handed to the narrative generator.
#[derive(Debug, Clone)]
pub enum NarrativeRequest {
    /// Explain the overall verdict on a swap.
    Decision {
        decision: Decision,
        confidence: f64,
        checks: Vec<CheckResult>,
        /// Absent when the swap context never loaded.
        swap: Option<SwapSummary>,
        swap_reason: Option<String>,
    },
    /// Explain why a swap would push an employee past the fatigue threshold.
    FatigueRisk {
        requester_name: String,
        requester_current: i64,
        requester_projected: i64,
        requester_risk_level: Option<String>,
        target_name: String,
        target_current: i64,
        target_projected: i64,
        target_risk_level: Option<String>,
        threshold: i64,
    },
}

/// Best-effort generator of short explanations.
///
/// Callers must always have a deterministic fallback; an `Err` here never
/// changes a decision, only its wording.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn explain(&self, request: &NarrativeRequest) -> Result<String, NarrativeError>;
}
