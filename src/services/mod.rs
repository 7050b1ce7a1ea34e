pub mod cache;
pub mod checks;
pub mod circuit_breaker;
pub mod decision;
pub mod pipeline;
pub mod request_context;
pub mod validation_service;

pub use cache::{CacheKeys, CacheStats, ResponseCache};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState};
pub use decision::{DecisionAggregator, DecisionOutcome};
pub use pipeline::{PipelineEngine, PipelineNode};
pub use request_context::RequestContext;
pub use validation_service::SwapValidationService;
