//! Caching decorator for any `HrDirectory`.
//!
//! Employees, shifts, availability and fatigue scores are cached with their
//! own TTLs. Assignment counts and monthly statistics change too often and
//! always go to the inner directory.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::errors::HrApiError;
use crate::domain::models::{
    Availability, CacheConfig, Employee, EmployeeStats, FatigueScore, Shift,
};
use crate::domain::ports::HrDirectory;
use crate::services::cache::{CacheKeys, ResponseCache};

/// Per-resource TTLs.
#[derive(Debug, Clone, Copy)]
pub struct ResourceTtls {
    pub employee: Duration,
    pub shift: Duration,
    pub availability: Duration,
    pub fatigue: Duration,
}

impl From<&CacheConfig> for ResourceTtls {
    fn from(config: &CacheConfig) -> Self {
        Self {
            employee: Duration::from_secs(config.employee_ttl_secs),
            shift: Duration::from_secs(config.shift_ttl_secs),
            availability: Duration::from_secs(config.availability_ttl_secs),
            fatigue: Duration::from_secs(config.fatigue_ttl_secs),
        }
    }
}

impl Default for ResourceTtls {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

/// Cached HR directory decorator.
pub struct CachedHrDirectory<D: HrDirectory> {
    inner: Arc<D>,
    cache: Arc<ResponseCache>,
    ttls: ResourceTtls,
}

impl<D: HrDirectory> CachedHrDirectory<D> {
    pub fn new(inner: Arc<D>, cache: Arc<ResponseCache>, ttls: ResourceTtls) -> Self {
        Self { inner, cache, ttls }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    async fn cached<T, F, Fut>(&self, key: String, ttl: Duration, fetch: F) -> Result<T, HrApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, HrApiError>>,
    {
        if let Some(value) = self.cache.get(&key) {
            match serde_json::from_value(value) {
                Ok(record) => return Ok(record),
                Err(err) => {
                    debug!(key = %key, error = %err, "Discarding undecodable cache entry");
                    self.cache.delete(&key);
                }
            }
        }

        let record = fetch().await?;
        self.cache.set(key, serde_json::to_value(&record)?, Some(ttl));
        Ok(record)
    }
}

#[async_trait]
impl<D: HrDirectory + 'static> HrDirectory for CachedHrDirectory<D> {
    async fn get_employee(&self, employee_id: i64) -> Result<Employee, HrApiError> {
        self.cached(CacheKeys::employee(employee_id), self.ttls.employee, || {
            self.inner.get_employee(employee_id)
        })
        .await
    }

    async fn get_shift(&self, shift_id: i64) -> Result<Shift, HrApiError> {
        self.cached(CacheKeys::shift(shift_id), self.ttls.shift, || {
            self.inner.get_shift(shift_id)
        })
        .await
    }

    async fn get_availability(
        &self,
        employee_id: i64,
        date: &str,
    ) -> Result<Option<Availability>, HrApiError> {
        let key = CacheKeys::availability(employee_id, date);
        if let Some(value) = self.cache.get(&key) {
            if let Ok(record) = serde_json::from_value(value) {
                return Ok(Some(record));
            }
        }

        // Empty payloads are not cached; the HR system may fill them in shortly.
        let record = self.inner.get_availability(employee_id, date).await?;
        if let Some(availability) = &record {
            self.cache.set(
                key,
                serde_json::to_value(availability)?,
                Some(self.ttls.availability),
            );
        }
        Ok(record)
    }

    async fn get_fatigue_score(&self, employee_id: i64) -> Result<FatigueScore, HrApiError> {
        self.cached(CacheKeys::fatigue(employee_id), self.ttls.fatigue, || {
            self.inner.get_fatigue_score(employee_id)
        })
        .await
    }

    async fn shift_assignment_count(&self, shift_id: i64) -> Result<usize, HrApiError> {
        self.inner.shift_assignment_count(shift_id).await
    }

    async fn get_employee_stats(&self, employee_id: i64) -> Result<EmployeeStats, HrApiError> {
        self.inner.get_employee_stats(employee_id).await
    }
}
