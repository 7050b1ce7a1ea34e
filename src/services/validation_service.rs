//! Entry point for validating shift swaps.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};

use super::cache::{CacheStats, ResponseCache};
use super::pipeline::PipelineEngine;
use super::request_context::RequestContext;
use crate::domain::errors::{HrApiError, PipelineError};
use crate::domain::models::{
    Config, Decision, PipelineState, RulesConfig, Suggestion, SwapValidationRequest,
    SwapValidationResponse,
};
use crate::domain::ports::{HrDirectory, NarrativeGenerator};
use crate::infrastructure::hr_api::{CredentialStatus, HrApiStack, TokenManager};
use crate::infrastructure::narrative::narrator_from_config;

/// Validates swaps and exposes the operational surface (cache, credential).
///
/// Cheap to clone; clones share the cache, breaker and credential.
#[derive(Clone)]
pub struct SwapValidationService {
    engine: Arc<PipelineEngine>,
    cache: Arc<ResponseCache>,
    tokens: Option<Arc<TokenManager>>,
    sweeper: Option<Arc<SweeperGuard>>,
}

/// Stops the background sweep once the last service clone is dropped.
struct SweeperGuard(JoinHandle<()>);

impl Drop for SweeperGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl SwapValidationService {
    /// Assemble a service from its collaborators.
    ///
    /// `cache` should be the cache `directory` writes to so that
    /// `cache_stats` and `clear_cache` see the same entries.
    pub fn new(
        directory: Arc<dyn HrDirectory>,
        narrator: Arc<dyn NarrativeGenerator>,
        rules: &RulesConfig,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            engine: Arc::new(PipelineEngine::new(directory, narrator, rules)),
            cache,
            tokens: None,
            sweeper: None,
        }
    }

    /// Attach the credential owner used by `credential_status` and
    /// `force_reauthenticate`.
    pub fn with_token_manager(mut self, tokens: Arc<TokenManager>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Build the production service against the HR API.
    pub fn from_config(config: &Config) -> Result<Self> {
        let stack = HrApiStack::from_config(config)?;
        let narrator = narrator_from_config(&config.narrative)?;

        Ok(
            Self::new(stack.directory, narrator, &config.rules, stack.cache)
                .with_token_manager(stack.tokens),
        )
    }

    /// Build the production service, start the cache sweep and, if
    /// configured, log in right away.
    pub async fn connect(config: &Config) -> Result<Self> {
        let mut service = Self::from_config(config)?;
        if config.cache.sweep_interval_secs > 0 {
            let every = Duration::from_secs(config.cache.sweep_interval_secs);
            service.sweeper = Some(Arc::new(SweeperGuard(service.spawn_cache_sweeper(every))));
        }
        if config.token.preauthenticate {
            service.preauthenticate().await;
        }
        Ok(service)
    }

    /// Log in ahead of the first request. Failure is logged, not returned;
    /// the first request will try again.
    pub async fn preauthenticate(&self) {
        let Some(tokens) = &self.tokens else {
            return;
        };
        match tokens.get_valid_token().await {
            Ok(_) => info!("Pre-authentication successful"),
            Err(err) => {
                error!(error = %err, "Pre-authentication failed");
                warn!("Will attempt to log in on first request");
            }
        }
    }

    /// Validate a swap. Always returns a well-formed response.
    pub async fn validate(&self, request: SwapValidationRequest) -> SwapValidationResponse {
        let started = Instant::now();
        let ctx = RequestContext::new(request.swap_id);
        let correlation_id = ctx.correlation_id().to_string();
        let span = info_span!(
            "validate_swap",
            correlation_id = %correlation_id,
            swap_id = request.swap_id
        );

        span.in_scope(|| info!(requester_id = request.requester_id, "Starting swap validation"));

        let engine = self.engine.clone();
        let state = PipelineState::new(request.clone());
        let handle = tokio::spawn(
            async move {
                let mut ctx = ctx;
                let result = engine.run(state, &mut ctx).await;
                (result, ctx)
            }
            .instrument(span.clone()),
        );

        let response = match handle.await {
            Ok((Ok(state), ctx)) => build_response(state, ctx, started.elapsed()),
            Ok((Err(err), ctx)) => {
                fallback_response(&request, &err, correlation_id, ctx, started.elapsed())
            }
            Err(join_err) => {
                let err = PipelineError::Aborted(join_err.to_string());
                let ctx = RequestContext::new(request.swap_id);
                fallback_response(&request, &err, correlation_id, ctx, started.elapsed())
            }
        };

        span.in_scope(|| {
            info!(
                decision = response.decision.as_str(),
                confidence = response.confidence,
                processing_time_ms = response.processing_time_ms,
                "Swap validation complete"
            );
        });
        response
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Response cache cleared");
    }

    /// Periodically drop expired cache entries until the handle is aborted.
    pub fn spawn_cache_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let cache = self.cache.clone();
        let every = every.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                cache.cleanup_expired();
            }
        })
    }

    pub async fn credential_status(&self) -> Option<CredentialStatus> {
        match &self.tokens {
            Some(tokens) => Some(tokens.status().await),
            None => None,
        }
    }

    pub async fn force_reauthenticate(&self) -> Result<CredentialStatus, HrApiError> {
        let tokens = self
            .tokens
            .as_ref()
            .ok_or_else(|| HrApiError::Auth("no HR API credential configured".to_string()))?;
        tokens.force_reauthenticate().await
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn build_response(
    state: PipelineState,
    ctx: RequestContext,
    elapsed: Duration,
) -> SwapValidationResponse {
    let decision = state.decision.unwrap_or(Decision::RequiresReview);
    SwapValidationResponse {
        swap_id: state.request.swap_id,
        decision,
        confidence: state.confidence.unwrap_or(0.0),
        reasoning: state
            .reasoning
            .unwrap_or_else(|| "Validation completed".to_string()),
        validation_passed: decision != Decision::AutoReject,
        checks: state.all_checks,
        risk_factors: state.risk_factors,
        suggestions: state.suggestions,
        processing_time_ms: elapsed_ms(elapsed),
        correlation_id: ctx.correlation_id().to_string(),
        step_timings_ms: ctx.into_timings(),
    }
}

fn fallback_response(
    request: &SwapValidationRequest,
    err: &PipelineError,
    correlation_id: String,
    ctx: RequestContext,
    elapsed: Duration,
) -> SwapValidationResponse {
    error!(correlation_id = %correlation_id, error = %err, "Swap validation failed");
    SwapValidationResponse {
        swap_id: request.swap_id,
        decision: Decision::RequiresReview,
        confidence: 0.0,
        reasoning: format!("Validation workflow encountered an error: {err}"),
        validation_passed: false,
        checks: Vec::new(),
        risk_factors: vec!["System error - manual review required".to_string()],
        suggestions: vec![Suggestion::new(
            "retry",
            "Please try again or contact support",
            "retry_request",
        )],
        processing_time_ms: elapsed_ms(elapsed),
        correlation_id,
        step_timings_ms: ctx.into_timings(),
    }
}
