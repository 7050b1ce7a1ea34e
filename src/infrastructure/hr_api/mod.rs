//! HR API integration
//!
//! Provides the resilient client stack used for every upstream call:
//! - `TokenManager`: bearer credential login, refresh and invalidation
//! - `RetryPolicy`: exponential backoff for transient failures
//! - `UpstreamClient`: breaker + credential + retry composed into one GET
//! - `HttpHrDirectory` / `CachedHrDirectory`: the `HrDirectory` port

pub mod cached_directory;
pub mod directory;
pub mod retry;
pub mod token_manager;
pub mod upstream_client;

pub use cached_directory::{CachedHrDirectory, ResourceTtls};
pub use directory::{Endpoints, HttpHrDirectory};
pub use retry::RetryPolicy;
pub use token_manager::{CredentialStatus, TokenManager};
pub use upstream_client::UpstreamClient;

use anyhow::{Context, Result};
use reqwest::Client as ReqwestClient;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::models::Config;
use crate::services::cache::ResponseCache;
use crate::services::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};

/// Join a base URL and a relative endpoint with exactly one `/` between them.
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Build the shared HTTP client used for the HR API.
pub fn build_http_client(timeout_secs: u64) -> Result<ReqwestClient> {
    ReqwestClient::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(10)
        .tcp_nodelay(true)
        .build()
        .context("Failed to build HTTP client")
}

/// The wired HR API stack: process-wide credential, breaker and cache.
pub struct HrApiStack {
    pub tokens: Arc<TokenManager>,
    pub breaker: Arc<CircuitBreaker>,
    pub cache: Arc<ResponseCache>,
    pub directory: Arc<CachedHrDirectory<HttpHrDirectory>>,
}

impl HrApiStack {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = build_http_client(config.hr_api.timeout_secs)?;

        let tokens = Arc::new(TokenManager::new(
            http_client.clone(),
            &config.hr_api,
            &config.token,
        ));
        let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::from(
            &config.circuit_breaker,
        )));
        let cache = Arc::new(ResponseCache::from_config(&config.cache));

        let client = Arc::new(UpstreamClient::new(
            http_client,
            config.hr_api.base_url.clone(),
            config.hr_api.envelope_key.clone(),
            tokens.clone(),
            breaker.clone(),
            RetryPolicy::from_config(&config.retry),
        ));
        let directory = Arc::new(CachedHrDirectory::new(
            Arc::new(HttpHrDirectory::new(client)),
            cache.clone(),
            ResourceTtls::from(&config.cache),
        ));

        Ok(Self {
            tokens,
            breaker,
            cache,
            directory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(join_url("http://hr/api/v1/", "employees/1"), "http://hr/api/v1/employees/1");
        assert_eq!(join_url("http://hr/api/v1", "/login"), "http://hr/api/v1/login");
        assert_eq!(join_url("http://hr/api/v1", "auth/refresh"), "http://hr/api/v1/auth/refresh");
    }

    #[test]
    fn test_stack_builds_from_default_config() {
        let stack = HrApiStack::from_config(&Config::default()).unwrap();
        assert!(stack.cache.is_empty());
    }
}
