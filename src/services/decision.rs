//! Reduces check results into the final verdict.

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use super::checks::{REQUESTER_FALLBACK_NAME, TARGET_FALLBACK_NAME};
use crate::domain::models::{CheckName, CheckResult, Decision, PipelineState, Shift, Suggestion};
use crate::domain::ports::{NarrativeGenerator, NarrativeRequest, SwapSummary};

/// Everything `make_decision` writes back into the pipeline state.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub decision: Decision,
    pub confidence: f64,
    pub reasoning: String,
    pub risk_factors: Vec<String>,
    pub checks: Vec<CheckResult>,
    pub suggestions: Vec<Suggestion>,
}

pub struct DecisionAggregator {
    narrator: Arc<dyn NarrativeGenerator>,
    min_rest_hours: f64,
}

impl DecisionAggregator {
    pub fn new(narrator: Arc<dyn NarrativeGenerator>, min_rest_hours: f64) -> Self {
        Self {
            narrator,
            min_rest_hours,
        }
    }

    pub async fn decide(&self, state: &PipelineState) -> DecisionOutcome {
        let checks = state.completed_checks();

        if let Some(error) = &state.error {
            warn!(error = %error, "Deciding on a failed workflow");
            return DecisionOutcome {
                decision: Decision::RequiresReview,
                confidence: 0.0,
                reasoning: format!("Workflow encountered an error: {error}"),
                risk_factors: vec![format!("Workflow error - manual review required: {error}")],
                checks,
                suggestions: vec![manager_override()],
            };
        }

        let decision = classify(&checks);
        let confidence = decision.confidence();

        let reasoning = match self
            .narrator
            .explain(&decision_narrative(state, decision, confidence, &checks))
            .await
        {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "Decision narrative unavailable, using fallback");
                fallback_reasoning(decision, &checks)
            }
        };

        let suggestions = if decision == Decision::AutoApprove {
            Vec::new()
        } else {
            self.suggestions(&checks, state)
        };

        info!(
            decision = decision.as_str(),
            confidence,
            suggestions = suggestions.len(),
            "Decision made"
        );

        DecisionOutcome {
            decision,
            confidence,
            reasoning,
            risk_factors: risk_factors(&checks),
            checks,
            suggestions,
        }
    }

    fn suggestions(&self, checks: &[CheckResult], state: &PipelineState) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        for check in checks.iter().filter(|c| !c.passed) {
            match check.check_name {
                CheckName::Availability => {
                    suggestions.push(Suggestion::new(
                        "alternative_dates",
                        "Consider requesting a swap for a different date when both employees are available",
                        "check_calendar",
                    ));
                    suggestions.push(Suggestion::new(
                        "alternative_employee",
                        "Try finding another colleague who is available for this shift",
                        "find_available_employees",
                    ));
                }
                CheckName::Fatigue => {
                    let current = state
                        .fatigue_check
                        .as_ref()
                        .and_then(|c| c.details.get("requester_current"))
                        .and_then(Value::as_i64)
                        .unwrap_or(0);
                    suggestions.push(Suggestion::new(
                        "delay_swap",
                        format!(
                            "Wait {} days for fatigue levels to recover before swapping",
                            recovery_days(current)
                        ),
                        "reschedule_later",
                    ));
                    suggestions.push(Suggestion::new(
                        "shorter_shift",
                        "Consider swapping for a shorter or less demanding shift",
                        "find_easier_shift",
                    ));
                }
                CheckName::Staffing => {
                    suggestions.push(Suggestion::new(
                        "manager_justification",
                        "Provide business justification for the swap despite staffing concerns",
                        "submit_justification",
                    ));
                    suggestions.push(Suggestion::new(
                        "find_coverage",
                        "Arrange for additional coverage before proceeding with swap",
                        "request_coverage",
                    ));
                }
                CheckName::Compliance => {
                    if mentions_rest(check) {
                        suggestions.push(Suggestion::new(
                            "reschedule_shift",
                            format!(
                                "Choose a shift that allows for the minimum {}-hour rest period between shifts",
                                self.min_rest_hours
                            ),
                            "find_compliant_shift",
                        ));
                    }
                    suggestions.push(Suggestion::new(
                        "hr_review",
                        "Contact HR to review compliance requirements or request an exception",
                        "contact_hr",
                    ));
                }
            }
        }

        suggestions.push(manager_override());
        suggestions
    }
}

/// Hard failure rejects, soft failure asks for review, otherwise approve.
pub fn classify(checks: &[CheckResult]) -> Decision {
    if checks.iter().any(CheckResult::is_hard_failure) {
        Decision::AutoReject
    } else if checks.iter().any(CheckResult::is_soft_failure) {
        Decision::RequiresReview
    } else {
        Decision::AutoApprove
    }
}

fn shift_summary(shift: &Shift) -> String {
    match shift.date_label() {
        "" => format!("{} shift", shift.kind()),
        date => format!("{} shift on {date}", shift.kind()),
    }
}

/// Facts about the swap and its checks for the decision narrative.
pub fn decision_narrative(
    state: &PipelineState,
    decision: Decision,
    confidence: f64,
    checks: &[CheckResult],
) -> NarrativeRequest {
    let swap = state.context.as_ref().map(|context| SwapSummary {
        requester_name: context.requester.name_or(REQUESTER_FALLBACK_NAME).to_string(),
        requester_shift: shift_summary(&context.requester_shift),
        target_name: context.target.name_or(TARGET_FALLBACK_NAME).to_string(),
        target_shift: shift_summary(&context.target_shift),
    });
    NarrativeRequest::Decision {
        decision,
        confidence,
        checks: checks.to_vec(),
        swap,
        swap_reason: state.request.swap_reason.clone(),
    }
}

pub fn risk_factors(checks: &[CheckResult]) -> Vec<String> {
    checks
        .iter()
        .filter(|c| !c.passed)
        .map(|c| {
            let level = if c.is_hard_failure() { "CRITICAL" } else { "WARNING" };
            format!("[{level}] {}: {}", c.check_name, c.message)
        })
        .collect()
}

pub fn fallback_reasoning(decision: Decision, checks: &[CheckResult]) -> String {
    let names = |pick: fn(&CheckResult) -> bool| {
        checks
            .iter()
            .filter(|c| pick(c))
            .map(|c| c.check_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    match decision {
        Decision::AutoApprove => {
            "All validation checks passed. This shift swap can be automatically approved.".to_string()
        }
        Decision::AutoReject => format!(
            "One or more critical checks failed: {}. This swap cannot proceed.",
            names(CheckResult::is_hard_failure)
        ),
        Decision::RequiresReview => format!(
            "Some concerns were identified that require manager review: {}.",
            names(CheckResult::is_soft_failure)
        ),
    }
}

/// Days to wait before a fatigued requester should take on another shift.
pub fn recovery_days(current_score: i64) -> i64 {
    if current_score > 40 {
        ((current_score - 40) / 10).max(2)
    } else {
        1
    }
}

fn mentions_rest(check: &CheckResult) -> bool {
    check
        .details
        .get("violations")
        .and_then(Value::as_array)
        .is_some_and(|violations| {
            violations
                .iter()
                .filter_map(Value::as_str)
                .any(|v| v.to_lowercase().contains("rest"))
        })
}

fn manager_override() -> Suggestion {
    Suggestion::new(
        "manager_override",
        "Request manual review and approval from your manager",
        "escalate_to_manager",
    )
}
