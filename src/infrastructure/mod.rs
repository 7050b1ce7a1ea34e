//! Infrastructure layer module
//!
//! Adapters for everything outside the process:
//! - HR API client stack (credential, breaker, retry, cache)
//! - Narrative text generation
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod hr_api;
pub mod logging;
pub mod narrative;
