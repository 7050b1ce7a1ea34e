//! Validation checks run by the pipeline.
//!
//! Each check fetches what it needs through the `HrDirectory` port, two
//! fetches at a time, and always produces a `CheckResult`. Fetch failures are
//! absorbed here: availability fails open, the others fail soft and ask for
//! manual review.

pub mod availability;
pub mod compliance;
pub mod fatigue;
pub mod staffing;

pub use availability::AvailabilityCheck;
pub use compliance::ComplianceCheck;
pub use fatigue::{fatigue_projection, FatigueCheck};
pub use staffing::StaffingCheck;

use async_trait::async_trait;

use crate::domain::models::{CheckName, CheckResult, SwapContext, SwapValidationRequest};

/// A single validation step.
#[async_trait]
pub trait CheckStep: Send + Sync {
    fn name(&self) -> CheckName;

    /// Evaluate the swap. Never fails; problems are reported in the result.
    async fn evaluate(&self, request: &SwapValidationRequest, context: &SwapContext) -> CheckResult;
}

pub(crate) const REQUESTER_FALLBACK_NAME: &str = "Requester";
pub(crate) const TARGET_FALLBACK_NAME: &str = "Target employee";
