use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::join_url;
use super::retry::RetryPolicy;
use super::token_manager::TokenManager;
use crate::domain::errors::HrApiError;
use crate::services::circuit_breaker::CircuitBreaker;

/// Resilient GET primitive for the HR API
///
/// Every call goes through, in order:
/// 1. Circuit breaker admission (denied calls never touch the network)
/// 2. Credential acquisition via [`TokenManager`]
/// 3. The request itself, with one re-login on a first-attempt 401
/// 4. Exponential backoff retries for 5xx and network errors
///
/// The breaker hears about each logical call exactly once.
pub struct UpstreamClient {
    /// Reusable HTTP client with connection pooling
    http_client: ReqwestClient,
    base_url: String,
    envelope_key: String,
    tokens: Arc<TokenManager>,
    breaker: Arc<CircuitBreaker>,
    retry_policy: RetryPolicy,
}

/// Reports a failure to the breaker if a call is dropped before it settles,
/// so an abandoned half-open trial cannot wedge the circuit.
struct BreakerCall<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl BreakerCall<'_> {
    fn success(mut self) {
        self.settled = true;
        self.breaker.record_success();
    }

    fn failure(mut self) {
        self.settled = true;
        self.breaker.record_failure();
    }
}

impl Drop for BreakerCall<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.record_failure();
        }
    }
}

impl UpstreamClient {
    pub fn new(
        http_client: ReqwestClient,
        base_url: impl Into<String>,
        envelope_key: impl Into<String>,
        tokens: Arc<TokenManager>,
        breaker: Arc<CircuitBreaker>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            envelope_key: envelope_key.into(),
            tokens,
            breaker,
            retry_policy,
        }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// GET `endpoint` (relative to the base URL) and return its payload.
    ///
    /// # Returns
    /// * `Ok(Value)` - Response body, unwrapped from the envelope field if present
    /// * `Err(HrApiError::UpstreamUnavailable)` - Breaker is open
    /// * `Err(HrApiError)` - Auth, network or HTTP failure after retries
    pub async fn get(&self, endpoint: &str) -> Result<Value, HrApiError> {
        self.get_with_query(endpoint, &[]).await
    }

    /// Like [`get`](Self::get), with `query` pairs form-encoded onto the URL.
    #[instrument(skip(self))]
    pub async fn get_with_query(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, HrApiError> {
        if !self.breaker.can_attempt() {
            let retry_after = self.breaker.retry_after();
            warn!(%retry_after, "Circuit open, not calling HR API");
            return Err(HrApiError::UpstreamUnavailable { retry_after });
        }

        let call = BreakerCall {
            breaker: &self.breaker,
            settled: false,
        };
        let url = join_url(&self.base_url, endpoint);

        match self
            .retry_policy
            .execute(|attempt| self.attempt(&url, query, attempt))
            .await
        {
            Ok(body) => {
                call.success();
                Ok(self.unwrap_envelope(body))
            }
            Err(err) => {
                call.failure();
                Err(err)
            }
        }
    }

    async fn attempt(
        &self,
        url: &str,
        query: &[(&str, &str)],
        attempt: u32,
    ) -> Result<Value, HrApiError> {
        let token = self.tokens.get_valid_token().await?;

        match self.send(url, query, &token).await {
            Err(err) if err.is_unauthorized() && attempt == 0 => {
                warn!("HR API rejected token, re-authenticating");
                self.tokens.invalidate(&token).await;
                let fresh = self.tokens.get_valid_token().await?;
                self.send(url, query, &fresh).await
            }
            other => other,
        }
    }

    async fn send(
        &self,
        url: &str,
        query: &[(&str, &str)],
        token: &str,
    ) -> Result<Value, HrApiError> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = %status, "HR API returned error status");
            return Err(HrApiError::Http { status, body });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn unwrap_envelope(&self, body: Value) -> Value {
        match body {
            Value::Object(mut map) if map.contains_key(&self.envelope_key) => map
                .remove(&self.envelope_key)
                .unwrap_or(Value::Null),
            other => other,
        }
    }
}
