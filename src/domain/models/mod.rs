pub mod check;
pub mod config;
pub mod hr;
pub mod pipeline_state;
pub mod swap;

pub use check::{CheckName, CheckResult, Severity};
pub use config::{
    BreakerConfig, CacheConfig, ComplianceRules, Config, FatigueRules, HrApiConfig,
    LoggingConfig, NarrativeConfig, RetryConfig, RulesConfig, TokenConfig,
};
pub use hr::{Availability, Employee, EmployeeStats, FatigueScore, MonthStats, Shift};
pub use pipeline_state::{PipelineState, SwapContext};
pub use swap::{Decision, Suggestion, SwapValidationRequest, SwapValidationResponse};
