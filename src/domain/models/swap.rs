use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::check::CheckResult;

/// A request to validate a shift swap between two employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapValidationRequest {
    pub swap_id: i64,
    pub requester_id: i64,
    pub requester_shift_id: i64,
    pub target_employee_id: i64,
    pub target_shift_id: i64,
    #[serde(default)]
    pub swap_reason: Option<String>,
}

/// Final verdict on a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    AutoApprove,
    AutoReject,
    RequiresReview,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoApprove => "auto_approve",
            Self::AutoReject => "auto_reject",
            Self::RequiresReview => "requires_review",
        }
    }

    /// Baseline confidence attached to each verdict.
    pub fn confidence(&self) -> f64 {
        match self {
            Self::AutoApprove => 0.90,
            Self::AutoReject => 0.95,
            Self::RequiresReview => 0.70,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remediation hint attached to a non-approved swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub action: String,
}

impl Suggestion {
    pub fn new(kind: &str, message: impl Into<String>, action: &str) -> Self {
        Self {
            kind: kind.to_string(),
            message: message.into(),
            action: action.to_string(),
        }
    }
}

/// The answer returned for a validation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapValidationResponse {
    pub swap_id: i64,
    pub decision: Decision,
    pub confidence: f64,
    pub reasoning: String,
    pub validation_passed: bool,
    pub checks: Vec<CheckResult>,
    pub risk_factors: Vec<String>,
    pub suggestions: Vec<Suggestion>,
    pub processing_time_ms: u64,
    pub correlation_id: String,
    #[serde(default)]
    pub step_timings_ms: BTreeMap<String, f64>,
}
