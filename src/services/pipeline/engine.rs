use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::transitions::{next_node, PipelineNode, MAX_TRANSITIONS};
use crate::domain::errors::PipelineError;
use crate::domain::models::{CheckName, PipelineState, RulesConfig, SwapContext};
use crate::domain::ports::{HrDirectory, NarrativeGenerator};
use crate::services::checks::{
    AvailabilityCheck, CheckStep, ComplianceCheck, FatigueCheck, StaffingCheck,
};
use crate::services::decision::DecisionAggregator;
use crate::services::request_context::{duration_ms, RequestContext};

/// Drives a `PipelineState` through the validation graph.
///
/// Each node only fills empty slots of the state. Once `load_context` has
/// set the error slot, the check nodes pass the state through untouched and
/// `make_decision` reports the error.
pub struct PipelineEngine {
    directory: Arc<dyn HrDirectory>,
    availability: Box<dyn CheckStep>,
    fatigue: Box<dyn CheckStep>,
    staffing: Box<dyn CheckStep>,
    compliance: Box<dyn CheckStep>,
    aggregator: DecisionAggregator,
}

impl PipelineEngine {
    pub fn new(
        directory: Arc<dyn HrDirectory>,
        narrator: Arc<dyn NarrativeGenerator>,
        rules: &RulesConfig,
    ) -> Self {
        Self {
            availability: Box::new(AvailabilityCheck::new(directory.clone())),
            fatigue: Box::new(FatigueCheck::new(
                directory.clone(),
                narrator.clone(),
                rules.fatigue.clone(),
            )),
            staffing: Box::new(StaffingCheck::new(directory.clone())),
            compliance: Box::new(ComplianceCheck::new(
                directory.clone(),
                rules.compliance.clone(),
            )),
            aggregator: DecisionAggregator::new(
                narrator,
                rules.compliance.min_rest_between_shifts_hours,
            ),
            directory,
        }
    }

    fn step(&self, name: CheckName) -> &dyn CheckStep {
        match name {
            CheckName::Availability => self.availability.as_ref(),
            CheckName::Fatigue => self.fatigue.as_ref(),
            CheckName::Staffing => self.staffing.as_ref(),
            CheckName::Compliance => self.compliance.as_ref(),
        }
    }

    /// Run the graph from `load_context` to `done`.
    pub async fn run(
        &self,
        mut state: PipelineState,
        ctx: &mut RequestContext,
    ) -> Result<PipelineState, PipelineError> {
        let mut node = PipelineNode::LoadContext;
        let mut transitions = 0;

        while node != PipelineNode::Done {
            if transitions >= MAX_TRANSITIONS {
                error!(node = %node, "Pipeline did not terminate");
                return Err(PipelineError::TransitionLimitExceeded(MAX_TRANSITIONS));
            }

            let started = Instant::now();
            self.execute(node, &mut state).await;
            let elapsed = started.elapsed();
            ctx.record_step(node.as_str(), elapsed);
            info!(step = node.as_str(), duration_ms = duration_ms(elapsed), "Step complete");

            node = next_node(node, &state);
            transitions += 1;
        }

        Ok(state)
    }

    async fn execute(&self, node: PipelineNode, state: &mut PipelineState) {
        match node {
            PipelineNode::LoadContext => self.load_context(state).await,
            PipelineNode::MakeDecision => {
                let outcome = self.aggregator.decide(state).await;
                state.decision = Some(outcome.decision);
                state.confidence = Some(outcome.confidence);
                state.reasoning = Some(outcome.reasoning);
                state.risk_factors = outcome.risk_factors;
                state.all_checks = outcome.checks;
                state.suggestions = outcome.suggestions;
            }
            PipelineNode::Done => {}
            check_node => {
                let Some(name) = check_node.check() else {
                    return;
                };
                if state.has_error() || state.check(name).is_some() {
                    return;
                }
                let Some(context) = state.context.as_ref() else {
                    return;
                };
                let result = self.step(name).evaluate(&state.request, context).await;
                state.record_check(result);
            }
        }
    }

    /// Fetch both employees and both shifts concurrently. Every failure is
    /// recorded; any one of them sets the error slot.
    async fn load_context(&self, state: &mut PipelineState) {
        if state.has_error() || state.context.is_some() {
            return;
        }

        let request = &state.request;
        let (requester, target, requester_shift, target_shift) = futures::join!(
            self.directory.get_employee(request.requester_id),
            self.directory.get_employee(request.target_employee_id),
            self.directory.get_shift(request.requester_shift_id),
            self.directory.get_shift(request.target_shift_id),
        );

        let mut errors = Vec::new();
        let mut note = |what: &str, err: &dyn std::fmt::Display| {
            error!(what, error = %err, "Failed to load context");
            errors.push(format!("Failed to load {what}: {err}"));
        };

        match (requester, target, requester_shift, target_shift) {
            (Ok(requester), Ok(target), Ok(requester_shift), Ok(target_shift)) => {
                state.context = Some(SwapContext {
                    requester,
                    target,
                    requester_shift,
                    target_shift,
                });
                info!("Context loaded");
                return;
            }
            (requester, target, requester_shift, target_shift) => {
                if let Err(err) = &requester {
                    note("requester employee", err);
                }
                if let Err(err) = &target {
                    note("target employee", err);
                }
                if let Err(err) = &requester_shift {
                    note("requester shift", err);
                }
                if let Err(err) = &target_shift {
                    note("target shift", err);
                }
            }
        }

        state.error = Some(errors.join("; "));
    }
}
