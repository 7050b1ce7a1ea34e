use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::{CheckStep, REQUESTER_FALLBACK_NAME, TARGET_FALLBACK_NAME};
use crate::domain::models::{
    CheckName, CheckResult, FatigueRules, Severity, SwapContext, SwapValidationRequest,
};
use crate::domain::ports::{HrDirectory, NarrativeGenerator, NarrativeRequest};

/// Project an employee's fatigue score after taking over a shift.
///
/// `current + trunc(base_impact * recovery * multiplier)`, where recovery
/// depends on the whole-day gap between the old and new shift dates and the
/// multiplier on how tired the employee already is. An unknown gap is
/// treated like a same-day swap.
pub fn fatigue_projection(
    current_score: i64,
    new_shift_type: &str,
    new_shift_date: Option<NaiveDate>,
    old_shift_date: Option<NaiveDate>,
    rules: &FatigueRules,
) -> i64 {
    let base_impact = rules
        .shift_impact
        .get(new_shift_type)
        .copied()
        .unwrap_or(rules.default_impact);

    let gap_days = match (new_shift_date, old_shift_date) {
        (Some(new), Some(old)) => Some((new - old).num_days().abs()),
        _ => None,
    };
    let recovery = match gap_days {
        Some(days) if days >= 2 => 0.5,
        Some(1) => 0.8,
        _ => 1.2,
    };

    let multiplier = if current_score > 50 {
        1.3
    } else if current_score > 30 {
        1.1
    } else {
        1.0
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let increase = (base_impact as f64 * recovery * multiplier) as i64;
    current_score + increase
}

/// Neither employee may reach the high-risk fatigue threshold.
pub struct FatigueCheck {
    directory: Arc<dyn HrDirectory>,
    narrator: Arc<dyn NarrativeGenerator>,
    rules: FatigueRules,
}

impl FatigueCheck {
    pub fn new(
        directory: Arc<dyn HrDirectory>,
        narrator: Arc<dyn NarrativeGenerator>,
        rules: FatigueRules,
    ) -> Self {
        Self {
            directory,
            narrator,
            rules,
        }
    }

    async fn analysis(&self, facts: NarrativeRequest) -> String {
        match self.narrator.explain(&facts).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "Fatigue narrative unavailable, using fallback");
                fallback_analysis(&facts)
            }
        }
    }
}

fn fallback_analysis(facts: &NarrativeRequest) -> String {
    let NarrativeRequest::FatigueRisk {
        requester_name,
        requester_projected,
        target_name,
        target_projected,
        threshold,
        ..
    } = facts
    else {
        return "Projected fatigue exceeds the safe limit".to_string();
    };

    let at_risk: Vec<String> = [
        (requester_name, requester_projected),
        (target_name, target_projected),
    ]
    .into_iter()
    .filter(|(_, projected)| **projected >= *threshold)
    .map(|(name, projected)| format!("{name} would reach {projected}"))
    .collect();

    format!(
        "High fatigue risk: {} (threshold {threshold})",
        at_risk.join("; ")
    )
}

#[async_trait]
impl CheckStep for FatigueCheck {
    fn name(&self) -> CheckName {
        CheckName::Fatigue
    }

    async fn evaluate(&self, request: &SwapValidationRequest, context: &SwapContext) -> CheckResult {
        let (requester_score, target_score) = futures::join!(
            self.directory.get_fatigue_score(request.requester_id),
            self.directory.get_fatigue_score(request.target_employee_id),
        );

        let (requester_score, target_score) = match (requester_score, target_score) {
            (Ok(r), Ok(t)) => (r, t),
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "Fatigue lookup failed");
                return CheckResult::needs_review(
                    CheckName::Fatigue,
                    format!("Could not fully assess fatigue: {err}"),
                    &err.to_string(),
                );
            }
        };

        let requester_shift = &context.requester_shift;
        let target_shift = &context.target_shift;

        let requester_after = fatigue_projection(
            requester_score.total_score,
            target_shift.kind(),
            target_shift.date(),
            requester_shift.date(),
            &self.rules,
        );
        let target_after = fatigue_projection(
            target_score.total_score,
            requester_shift.kind(),
            requester_shift.date(),
            target_shift.date(),
            &self.rules,
        );

        let threshold = self.rules.high_risk_threshold;
        let passed = requester_after < threshold && target_after < threshold;
        info!(passed, requester_after, target_after, "Fatigue check complete");

        let ai_analysis = if passed {
            None
        } else {
            Some(
                self.analysis(NarrativeRequest::FatigueRisk {
                    requester_name: context.requester.name_or(REQUESTER_FALLBACK_NAME).to_string(),
                    requester_current: requester_score.total_score,
                    requester_projected: requester_after,
                    requester_risk_level: requester_score.risk_level.clone(),
                    target_name: context.target.name_or(TARGET_FALLBACK_NAME).to_string(),
                    target_current: target_score.total_score,
                    target_projected: target_after,
                    target_risk_level: target_score.risk_level.clone(),
                    threshold,
                })
                .await,
            )
        };

        CheckResult::new(
            CheckName::Fatigue,
            passed,
            Severity::Hard,
            ai_analysis
                .clone()
                .unwrap_or_else(|| "Fatigue levels are within safe limits".to_string()),
            json!({
                "requester_current": requester_score.total_score,
                "requester_after": requester_after,
                "requester_risk_level": requester_score.risk_level,
                "target_current": target_score.total_score,
                "target_after": target_after,
                "target_risk_level": target_score.risk_level,
                "threshold": threshold,
                "ai_analysis": ai_analysis,
            }),
        )
    }
}
