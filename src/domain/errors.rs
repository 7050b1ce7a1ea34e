//! Domain errors for the swap validation engine.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the upstream HR API client.
#[derive(Debug, Error)]
pub enum HrApiError {
    /// Credential exchange (login or refresh fallback) failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Circuit breaker is open; no request was sent.
    #[error("HR API unavailable (circuit open), retry after {retry_after}")]
    UpstreamUnavailable { retry_after: DateTime<Utc> },

    /// Connection, DNS or timeout failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP error ({status}): {body}")]
    Http { status: StatusCode, body: String },

    /// Response body was not the JSON we expected.
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl HrApiError {
    /// Returns true if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    /// Returns true if this is a permanent error that should not be retried
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// True for a 401 from the HR API.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    /// True when the breaker rejected the call without touching the network.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. })
    }
}

/// Errors from the narrative text collaborator.
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("Narrative generation is not configured")]
    NotConfigured,

    #[error("Narrative request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Narrative API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    #[error("Narrative response contained no text")]
    EmptyResponse,
}

/// Failures of the pipeline engine itself (not of individual checks).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Pipeline exceeded {0} transitions without reaching a terminal node")]
    TransitionLimitExceeded(usize),

    #[error("Pipeline task aborted: {0}")]
    Aborted(String),
}
