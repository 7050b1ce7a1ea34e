//! Narrative generation adapters
//!
//! `MessagesNarrator` calls a hosted messages API; `DisabledNarrator` always
//! declines so callers fall back to their deterministic wording.

pub mod messages;

pub use messages::MessagesNarrator;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::NarrativeError;
use crate::domain::models::NarrativeConfig;
use crate::domain::ports::{NarrativeGenerator, NarrativeRequest};

/// Narrator used when generation is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNarrator;

#[async_trait]
impl NarrativeGenerator for DisabledNarrator {
    async fn explain(&self, _request: &NarrativeRequest) -> Result<String, NarrativeError> {
        Err(NarrativeError::NotConfigured)
    }
}

/// Pick the narrator for a configuration.
pub fn narrator_from_config(config: &NarrativeConfig) -> Result<Arc<dyn NarrativeGenerator>> {
    if config.enabled && !config.api_key.is_empty() {
        Ok(Arc::new(MessagesNarrator::from_config(config)?))
    } else {
        Ok(Arc::new(DisabledNarrator))
    }
}
