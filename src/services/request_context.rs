//! Per-request context carried through one validation run.

use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Correlation id and step timings for a single validation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    correlation_id: String,
    swap_id: i64,
    step_timings_ms: BTreeMap<String, f64>,
}

impl RequestContext {
    pub fn new(swap_id: i64) -> Self {
        let mut correlation_id = Uuid::new_v4().simple().to_string();
        correlation_id.truncate(8);
        Self {
            correlation_id,
            swap_id,
            step_timings_ms: BTreeMap::new(),
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn swap_id(&self) -> i64 {
        self.swap_id
    }

    pub fn record_step(&mut self, step: &str, elapsed: Duration) {
        self.step_timings_ms
            .insert(step.to_string(), duration_ms(elapsed));
    }

    pub fn step_timings_ms(&self) -> &BTreeMap<String, f64> {
        &self.step_timings_ms
    }

    /// Consume the context, returning its timings.
    pub fn into_timings(self) -> BTreeMap<String, f64> {
        self.step_timings_ms
    }
}

/// Milliseconds rounded to two decimals.
pub fn duration_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100_000.0).round() / 100.0
}
