//! Swapguard - shift swap validation engine
//!
//! Decides whether two employees may exchange shifts by running four checks
//! (availability, fatigue, staffing, compliance) against an upstream HR API
//! and reducing their results into approve, reject or manual review.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the port traits
//! - **Service Layer** (`services`): checks, pipeline, decision, cache, breaker
//! - **Infrastructure Layer** (`infrastructure`): HR API client, narrative
//!   client, configuration and logging
//! - **CLI Layer** (`cli`): operator command-line interface
//!
//! # Example
//!
//! ```ignore
//! use swapguard::{ConfigLoader, SwapValidationService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let service = SwapValidationService::connect(&config).await?;
//!     let response = service.validate(request).await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{HrApiError, NarrativeError, PipelineError};
pub use domain::models::{
    CheckName, CheckResult, Config, Decision, Severity, Suggestion, SwapValidationRequest,
    SwapValidationResponse,
};
pub use domain::ports::{HrDirectory, NarrativeGenerator};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::SwapValidationService;
