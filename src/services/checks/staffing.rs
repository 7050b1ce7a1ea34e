use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::CheckStep;
use crate::domain::models::{CheckName, CheckResult, Severity, SwapContext, SwapValidationRequest};
use crate::domain::ports::HrDirectory;

/// Both shifts must keep at least their required head count.
pub struct StaffingCheck {
    directory: Arc<dyn HrDirectory>,
}

impl StaffingCheck {
    pub fn new(directory: Arc<dyn HrDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl CheckStep for StaffingCheck {
    fn name(&self) -> CheckName {
        CheckName::Staffing
    }

    async fn evaluate(&self, request: &SwapValidationRequest, context: &SwapContext) -> CheckResult {
        let (requester_count, target_count) = futures::join!(
            self.directory.shift_assignment_count(request.requester_shift_id),
            self.directory.shift_assignment_count(request.target_shift_id),
        );

        let (requester_current, target_current) = match (requester_count, target_count) {
            (Ok(r), Ok(t)) => (r, t),
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "Shift assignment lookup failed");
                return CheckResult::needs_review(
                    CheckName::Staffing,
                    format!("Could not verify staffing: {err}"),
                    &err.to_string(),
                );
            }
        };

        let requester_required = context.requester_shift.required_staff();
        let target_required = context.target_shift.required_staff();

        let mut problems = Vec::new();
        if requester_current < requester_required as usize {
            problems.push(format!(
                "Requester's shift needs {requester_required} staff, has {requester_current}"
            ));
        }
        if target_current < target_required as usize {
            problems.push(format!(
                "Target's shift needs {target_required} staff, has {target_current}"
            ));
        }

        let passed = problems.is_empty();
        info!(passed, "Staffing check complete");

        CheckResult::new(
            CheckName::Staffing,
            passed,
            Severity::Soft,
            if passed {
                "Staffing levels maintained after swap".to_string()
            } else {
                problems.join("; ")
            },
            json!({
                "requester_shift_required": requester_required,
                "requester_shift_current": requester_current,
                "target_shift_required": target_required,
                "target_shift_current": target_current,
            }),
        )
    }
}
