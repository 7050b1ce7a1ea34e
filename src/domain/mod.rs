//! Domain layer for the swapguard validation engine
//!
//! This module contains the records exchanged with the HR system, the
//! pipeline state and verdict types, and the ports the services depend on.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{HrApiError, NarrativeError, PipelineError};
