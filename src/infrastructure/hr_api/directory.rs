//! `HrDirectory` backed by the HR REST API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::upstream_client::UpstreamClient;
use crate::domain::errors::HrApiError;
use crate::domain::models::{Availability, Employee, EmployeeStats, FatigueScore, Shift};
use crate::domain::ports::HrDirectory;

/// HR API endpoints, relative to the configured base URL.
pub struct Endpoints;

impl Endpoints {
    pub fn employee(employee_id: i64) -> String {
        format!("employees/{employee_id}")
    }

    pub fn shift(shift_id: i64) -> String {
        format!("shifts/{shift_id}")
    }

    /// Takes the shift date as a `date` query parameter.
    pub fn availability(employee_id: i64) -> String {
        format!("employees/{employee_id}/availability")
    }

    pub fn fatigue_score(employee_id: i64) -> String {
        format!("fatigue-scores/{employee_id}")
    }

    pub fn shift_assignments(shift_id: i64) -> String {
        format!("shifts/{shift_id}/assignments")
    }

    pub fn employee_shifts(employee_id: i64) -> String {
        format!("employee/{employee_id}/shifts")
    }
}

/// Uncached HR directory. Wrap it in `CachedHrDirectory` for production use.
pub struct HttpHrDirectory {
    client: Arc<UpstreamClient>,
}

impl HttpHrDirectory {
    pub fn new(client: Arc<UpstreamClient>) -> Self {
        Self { client }
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, HrApiError> {
        let payload = self.client.get(endpoint).await?;
        Ok(serde_json::from_value(payload)?)
    }
}

#[async_trait]
impl HrDirectory for HttpHrDirectory {
    async fn get_employee(&self, employee_id: i64) -> Result<Employee, HrApiError> {
        self.fetch(&Endpoints::employee(employee_id)).await
    }

    async fn get_shift(&self, shift_id: i64) -> Result<Shift, HrApiError> {
        self.fetch(&Endpoints::shift(shift_id)).await
    }

    async fn get_availability(
        &self,
        employee_id: i64,
        date: &str,
    ) -> Result<Option<Availability>, HrApiError> {
        let payload = self
            .client
            .get_with_query(&Endpoints::availability(employee_id), &[("date", date)])
            .await?;
        if is_empty_payload(&payload) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(payload)?))
    }

    async fn get_fatigue_score(&self, employee_id: i64) -> Result<FatigueScore, HrApiError> {
        self.fetch(&Endpoints::fatigue_score(employee_id)).await
    }

    async fn shift_assignment_count(&self, shift_id: i64) -> Result<usize, HrApiError> {
        let payload = self
            .client
            .get(&Endpoints::shift_assignments(shift_id))
            .await?;
        Ok(payload.as_array().map_or(0, Vec::len))
    }

    async fn get_employee_stats(&self, employee_id: i64) -> Result<EmployeeStats, HrApiError> {
        self.fetch(&Endpoints::employee_shifts(employee_id)).await
    }
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
