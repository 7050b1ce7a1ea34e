//! Circuit breaker guarding the upstream HR API.
//!
//! Opens after a run of consecutive failures, stays open for a cooldown,
//! then lets exactly one trial request through. The trial's outcome closes
//! or re-opens the circuit.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::models::BreakerConfig;

/// Upper bound on the cooldown; keeps the chrono arithmetic in range.
const MAX_OPEN_TIMEOUT_SECS: i64 = 7 * 24 * 3600;

/// Configuration for the circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// Duration to keep circuit open before trying half-open.
    pub open_timeout: Duration,
    /// Whether to enable the circuit breaker.
    pub enabled: bool,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout: Duration::seconds(60),
            enabled: true,
        }
    }
}

impl From<&BreakerConfig> for CircuitBreakerConfig {
    fn from(config: &BreakerConfig) -> Self {
        Self {
            failure_threshold: config.failure_threshold,
            open_timeout: Duration::seconds(
                i64::try_from(config.timeout_secs)
                    .unwrap_or(MAX_OPEN_TIMEOUT_SECS)
                    .min(MAX_OPEN_TIMEOUT_SECS),
            ),
            enabled: config.enabled,
        }
    }
}

/// State of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Circuit is closed, requests flow normally.
    Closed,
    /// Circuit is open, requests are blocked.
    Open,
    /// Circuit is testing if the system has recovered.
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

/// Point-in-time view of the breaker, for status output and logs.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    pub last_failure_time: Option<DateTime<Utc>>,
    pub open_count: u32,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    last_failure_time: Option<DateTime<Utc>>,
    /// Set while the single half-open trial request is outstanding.
    trial_in_flight: bool,
    open_count: u32,
}

impl BreakerInner {
    fn open(&mut self, now: DateTime<Utc>) {
        self.state = CircuitState::Open;
        self.last_failure_time = Some(now);
        self.trial_in_flight = false;
        self.open_count += 1;
    }

    fn close(&mut self) {
        self.state = CircuitState::Closed;
        self.failure_count = 0;
        self.trial_in_flight = false;
    }
}

/// Process-wide breaker. All read-modify-write sequences run under one lock.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure_time: None,
                trial_in_flight: false,
                open_count: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Check if the circuit allows a request.
    ///
    /// While half-open only the first caller is admitted; everyone else is
    /// denied until that trial reports back.
    pub fn can_attempt(&self) -> bool {
        if !self.config.enabled {
            return true;
        }

        let now = Utc::now();
        let mut inner = self.lock();
        let state = inner.state;
        match state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let cooled_down = inner
                    .last_failure_time
                    .is_none_or(|at| now - at > self.config.open_timeout);
                if cooled_down {
                    inner.state = CircuitState::HalfOpen;
                    inner.trial_in_flight = true;
                    info!("Circuit breaker half-open, allowing trial request");
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    false
                } else {
                    inner.trial_in_flight = true;
                    true
                }
            }
        }
    }

    /// Record a success.
    ///
    /// A half-open trial success closes the circuit and a success while
    /// closed clears the failure count. An open circuit only leaves through
    /// the cooldown, so a late success from a call admitted before it opened
    /// is ignored.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        let state = inner.state;
        match state {
            CircuitState::HalfOpen => {
                info!("Circuit breaker trial succeeded, closing");
                inner.close();
            }
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::Open => {
                debug!("Ignoring success reported while circuit is open");
            }
        }
    }

    /// Record a failure.
    pub fn record_failure(&self) {
        let now = Utc::now();
        let mut inner = self.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);
        inner.last_failure_time = Some(now);

        let state = inner.state;
        match state {
            CircuitState::HalfOpen => {
                inner.open(now);
                warn!("Circuit breaker trial request failed, re-opening");
            }
            CircuitState::Closed if inner.failure_count >= self.config.failure_threshold => {
                inner.open(now);
                warn!(
                    failures = inner.failure_count,
                    threshold = self.config.failure_threshold,
                    "Circuit breaker opened"
                );
            }
            _ => {}
        }
    }

    /// When a denied caller may expect the next trial to be admitted.
    pub fn retry_after(&self) -> DateTime<Utc> {
        let inner = self.lock();
        inner
            .last_failure_time
            .map_or_else(Utc::now, |at| at + self.config.open_timeout)
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.lock();
        CircuitSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            last_failure_time: inner.last_failure_time,
            open_count: inner.open_count,
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
