//! State threaded through the validation pipeline.

use super::check::{CheckName, CheckResult};
use super::hr::{Employee, Shift};
use super::swap::{Decision, Suggestion, SwapValidationRequest};

/// Employee and shift records loaded before any check runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapContext {
    pub requester: Employee,
    pub target: Employee,
    pub requester_shift: Shift,
    pub target_shift: Shift,
}

/// Evolving record for one validation run.
///
/// Steps only fill empty slots; nothing is overwritten once set. After
/// `error` is set no step does upstream work.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    pub request: SwapValidationRequest,
    pub context: Option<SwapContext>,

    pub availability_check: Option<CheckResult>,
    pub fatigue_check: Option<CheckResult>,
    pub staffing_check: Option<CheckResult>,
    pub compliance_check: Option<CheckResult>,

    pub decision: Option<Decision>,
    pub confidence: Option<f64>,
    pub reasoning: Option<String>,
    pub risk_factors: Vec<String>,
    pub all_checks: Vec<CheckResult>,
    pub suggestions: Vec<Suggestion>,

    pub error: Option<String>,
}

impl PipelineState {
    pub fn new(request: SwapValidationRequest) -> Self {
        Self {
            request,
            context: None,
            availability_check: None,
            fatigue_check: None,
            staffing_check: None,
            compliance_check: None,
            decision: None,
            confidence: None,
            reasoning: None,
            risk_factors: Vec::new(),
            all_checks: Vec::new(),
            suggestions: Vec::new(),
            error: None,
        }
    }

    pub fn check(&self, name: CheckName) -> Option<&CheckResult> {
        match name {
            CheckName::Availability => self.availability_check.as_ref(),
            CheckName::Fatigue => self.fatigue_check.as_ref(),
            CheckName::Staffing => self.staffing_check.as_ref(),
            CheckName::Compliance => self.compliance_check.as_ref(),
        }
    }

    /// Store a check result in its slot. An already-filled slot is kept.
    pub fn record_check(&mut self, result: CheckResult) {
        let slot = match result.check_name {
            CheckName::Availability => &mut self.availability_check,
            CheckName::Fatigue => &mut self.fatigue_check,
            CheckName::Staffing => &mut self.staffing_check,
            CheckName::Compliance => &mut self.compliance_check,
        };
        if slot.is_none() {
            *slot = Some(result);
        }
    }

    /// Computed check results in pipeline order.
    pub fn completed_checks(&self) -> Vec<CheckResult> {
        [
            &self.availability_check,
            &self.fatigue_check,
            &self.staffing_check,
            &self.compliance_check,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
