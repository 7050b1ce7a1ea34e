//! Pipeline nodes and the pure transition function between them.

use std::fmt;

use crate::domain::models::{CheckName, PipelineState};

/// Upper bound on transitions per run; the graph is acyclic and needs six.
pub const MAX_TRANSITIONS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineNode {
    LoadContext,
    CheckAvailability,
    CheckFatigue,
    CheckStaffing,
    CheckCompliance,
    MakeDecision,
    Done,
}

impl PipelineNode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadContext => "load_context",
            Self::CheckAvailability => "check_availability",
            Self::CheckFatigue => "check_fatigue",
            Self::CheckStaffing => "check_staffing",
            Self::CheckCompliance => "check_compliance",
            Self::MakeDecision => "make_decision",
            Self::Done => "done",
        }
    }

    /// The check a node evaluates, if it is a check node.
    pub fn check(&self) -> Option<CheckName> {
        match self {
            Self::CheckAvailability => Some(CheckName::Availability),
            Self::CheckFatigue => Some(CheckName::Fatigue),
            Self::CheckStaffing => Some(CheckName::Staffing),
            Self::CheckCompliance => Some(CheckName::Compliance),
            _ => None,
        }
    }
}

impl fmt::Display for PipelineNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn hard_failed(state: &PipelineState, name: CheckName) -> bool {
    state.check(name).is_some_and(|c| c.is_hard_failure())
}

/// Choose the node that follows `node` given the state it produced.
///
/// A hard availability or fatigue failure jumps straight to the decision.
pub fn next_node(node: PipelineNode, state: &PipelineState) -> PipelineNode {
    match node {
        PipelineNode::LoadContext => PipelineNode::CheckAvailability,
        PipelineNode::CheckAvailability => {
            if hard_failed(state, CheckName::Availability) {
                PipelineNode::MakeDecision
            } else {
                PipelineNode::CheckFatigue
            }
        }
        PipelineNode::CheckFatigue => {
            if hard_failed(state, CheckName::Fatigue) {
                PipelineNode::MakeDecision
            } else {
                PipelineNode::CheckStaffing
            }
        }
        PipelineNode::CheckStaffing => PipelineNode::CheckCompliance,
        PipelineNode::CheckCompliance => PipelineNode::MakeDecision,
        PipelineNode::MakeDecision | PipelineNode::Done => PipelineNode::Done,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CheckResult, Severity, SwapValidationRequest};
    use serde_json::Value;

    fn state() -> PipelineState {
        PipelineState::new(SwapValidationRequest {
            swap_id: 1,
            requester_id: 10,
            requester_shift_id: 100,
            target_employee_id: 20,
            target_shift_id: 200,
            swap_reason: None,
        })
    }

    fn result(name: CheckName, passed: bool, severity: Severity) -> CheckResult {
        CheckResult::new(name, passed, severity, "", Value::Null)
    }

    #[test]
    fn test_happy_path_visits_every_node() {
        let state = state();
        let mut node = PipelineNode::LoadContext;
        let mut visited = vec![node];
        while node != PipelineNode::Done {
            node = next_node(node, &state);
            visited.push(node);
        }
        assert_eq!(
            visited,
            vec![
                PipelineNode::LoadContext,
                PipelineNode::CheckAvailability,
                PipelineNode::CheckFatigue,
                PipelineNode::CheckStaffing,
                PipelineNode::CheckCompliance,
                PipelineNode::MakeDecision,
                PipelineNode::Done,
            ]
        );
    }

    #[test]
    fn test_hard_availability_failure_skips_to_decision() {
        let mut state = state();
        state.record_check(result(CheckName::Availability, false, Severity::Hard));
        assert_eq!(
            next_node(PipelineNode::CheckAvailability, &state),
            PipelineNode::MakeDecision
        );
    }

    #[test]
    fn test_hard_fatigue_failure_skips_to_decision() {
        let mut state = state();
        state.record_check(result(CheckName::Fatigue, false, Severity::Hard));
        assert_eq!(
            next_node(PipelineNode::CheckFatigue, &state),
            PipelineNode::MakeDecision
        );
    }

    #[test]
    fn test_soft_fatigue_result_continues() {
        let mut state = state();
        state.record_check(result(CheckName::Fatigue, true, Severity::Soft));
        assert_eq!(
            next_node(PipelineNode::CheckFatigue, &state),
            PipelineNode::CheckStaffing
        );
    }

    #[test]
    fn test_staffing_always_reaches_compliance() {
        let mut state = state();
        state.record_check(result(CheckName::Staffing, false, Severity::Soft));
        assert_eq!(
            next_node(PipelineNode::CheckStaffing, &state),
            PipelineNode::CheckCompliance
        );
    }
}
