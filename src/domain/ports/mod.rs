//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces that infrastructure adapters
//! must implement:
//! - HrDirectory: read access to the upstream HR system
//! - NarrativeGenerator: short human-readable explanations
//!
//! The pipeline and its checks depend only on these traits, so tests can
//! swap in in-memory fakes.

pub mod hr_directory;
pub mod narrative;

pub use hr_directory::HrDirectory;
pub use narrative::{NarrativeGenerator, NarrativeRequest, SwapSummary};
