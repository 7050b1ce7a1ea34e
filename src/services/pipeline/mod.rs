//! The validation pipeline: an explicit state machine over `PipelineState`.

pub mod engine;
pub mod transitions;

pub use engine::PipelineEngine;
pub use transitions::{next_node, PipelineNode, MAX_TRANSITIONS};
