use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::{CheckStep, REQUESTER_FALLBACK_NAME, TARGET_FALLBACK_NAME};
use crate::domain::errors::HrApiError;
use crate::domain::models::{
    Availability, CheckName, CheckResult, Severity, SwapContext, SwapValidationRequest,
};
use crate::domain::ports::HrDirectory;

/// Both employees must be free on the date of the shift they take over.
pub struct AvailabilityCheck {
    directory: Arc<dyn HrDirectory>,
}

/// Human phrase for an unavailability reason code.
pub fn reason_phrase(reason: Option<&str>) -> &'static str {
    match reason {
        Some("vacation") => "on vacation",
        Some("sick") => "on sick leave",
        Some("personal") => "unavailable (personal day)",
        Some("appointment") => "has an appointment",
        _ => "marked as unavailable",
    }
}

/// Resolve a fetch outcome to (available, reason). Missing data and fetch
/// errors count as available.
fn resolve(outcome: Result<Option<Availability>, HrApiError>, who: &str) -> (bool, Option<String>) {
    match outcome {
        Ok(Some(availability)) => (availability.is_available, availability.reason),
        Ok(None) => (true, None),
        Err(err) => {
            warn!(employee = who, error = %err, "Availability lookup failed, assuming available");
            (true, None)
        }
    }
}

impl AvailabilityCheck {
    pub fn new(directory: Arc<dyn HrDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl CheckStep for AvailabilityCheck {
    fn name(&self) -> CheckName {
        CheckName::Availability
    }

    async fn evaluate(&self, request: &SwapValidationRequest, context: &SwapContext) -> CheckResult {
        let requester_date = context.requester_shift.date_label();
        let target_date = context.target_shift.date_label();
        let requester_name = context.requester.name_or(REQUESTER_FALLBACK_NAME);
        let target_name = context.target.name_or(TARGET_FALLBACK_NAME);

        // Each employee is checked on the date of the shift they would take.
        let (requester_outcome, target_outcome) = futures::join!(
            self.directory
                .get_availability(request.requester_id, target_date),
            self.directory
                .get_availability(request.target_employee_id, requester_date),
        );

        let (requester_available, requester_reason) = resolve(requester_outcome, "requester");
        let (target_available, target_reason) = resolve(target_outcome, "target");

        let mut reasons = Vec::new();
        if !requester_available {
            reasons.push(format!(
                "{requester_name} is {} on {target_date}",
                reason_phrase(requester_reason.as_deref())
            ));
        }
        if !target_available {
            reasons.push(format!(
                "{target_name} is {} on {requester_date}",
                reason_phrase(target_reason.as_deref())
            ));
        }

        let passed = reasons.is_empty();
        info!(passed, "Availability check complete");

        CheckResult::new(
            CheckName::Availability,
            passed,
            Severity::Hard,
            if passed {
                "Both employees available".to_string()
            } else {
                reasons.join("; ")
            },
            json!({
                "requester_available": requester_available,
                "target_available": target_available,
                "requester_reason": requester_reason,
                "target_reason": target_reason,
                "requester_shift_date": requester_date,
                "target_shift_date": target_date,
            }),
        )
    }
}
