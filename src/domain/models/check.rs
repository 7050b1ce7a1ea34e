use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// The four validation checks, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    Availability,
    Fatigue,
    Staffing,
    Compliance,
}

impl CheckName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Availability => "availability",
            Self::Fatigue => "fatigue",
            Self::Staffing => "staffing",
            Self::Compliance => "compliance",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a failing check blocks the swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Failure rejects the swap and halts the remaining checks.
    Hard,
    /// Failure only flags the swap for manual review.
    Soft,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::Soft => "soft",
        }
    }
}

/// Outcome of a single validation check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_name: CheckName,
    pub passed: bool,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl CheckResult {
    pub fn new(
        check_name: CheckName,
        passed: bool,
        severity: Severity,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            check_name,
            passed,
            severity,
            message: message.into(),
            details,
        }
    }

    /// A check that could not be evaluated: passes, but asks for a human.
    pub fn needs_review(check_name: CheckName, message: impl Into<String>, error: &str) -> Self {
        Self::new(
            check_name,
            true,
            Severity::Soft,
            message,
            json!({ "error": error, "needs_manual_review": true }),
        )
    }

    pub fn is_hard_failure(&self) -> bool {
        !self.passed && self.severity == Severity::Hard
    }

    pub fn is_soft_failure(&self) -> bool {
        !self.passed && self.severity == Severity::Soft
    }

    pub fn needs_manual_review(&self) -> bool {
        self.details
            .get("needs_manual_review")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_review_passes_soft() {
        let result = CheckResult::needs_review(CheckName::Staffing, "Could not verify", "timeout");
        assert!(result.passed);
        assert_eq!(result.severity, Severity::Soft);
        assert!(result.needs_manual_review());
        assert!(!result.is_soft_failure());
    }

    #[test]
    fn test_failure_classification() {
        let hard = CheckResult::new(CheckName::Availability, false, Severity::Hard, "x", Value::Null);
        assert!(hard.is_hard_failure());
        assert!(!hard.is_soft_failure());

        let soft = CheckResult::new(CheckName::Staffing, false, Severity::Soft, "x", Value::Null);
        assert!(soft.is_soft_failure());
        assert!(!soft.needs_manual_review());
    }

    #[test]
    fn test_serialized_names() {
        let result = CheckResult::new(CheckName::Compliance, true, Severity::Soft, "ok", json!({}));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["check_name"], "compliance");
        assert_eq!(value["severity"], "soft");
    }
}
