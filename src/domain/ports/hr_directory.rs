use async_trait::async_trait;

use crate::domain::errors::HrApiError;
use crate::domain::models::{Availability, Employee, EmployeeStats, FatigueScore, Shift};

/// Read access to the upstream HR system.
///
/// Implementations are expected to handle authentication, retries and
/// caching themselves; callers only see a record or an `HrApiError`.
#[async_trait]
pub trait HrDirectory: Send + Sync {
    /// Fetch an employee record
    ///
    /// # Arguments
    /// * `employee_id` - HR identifier of the employee
    async fn get_employee(&self, employee_id: i64) -> Result<Employee, HrApiError>;

    /// Fetch a shift record
    async fn get_shift(&self, shift_id: i64) -> Result<Shift, HrApiError>;

    /// Fetch an employee's availability on a date
    ///
    /// # Arguments
    /// * `employee_id` - HR identifier of the employee
    /// * `date` - Date as sent by the HR API (`YYYY-MM-DD`)
    ///
    /// # Returns
    /// * `Ok(Some(availability))` when the HR system has an entry
    /// * `Ok(None)` when it returns an empty payload
    async fn get_availability(
        &self,
        employee_id: i64,
        date: &str,
    ) -> Result<Option<Availability>, HrApiError>;

    /// Fetch an employee's current fatigue score
    async fn get_fatigue_score(&self, employee_id: i64) -> Result<FatigueScore, HrApiError>;

    /// Count the employees currently assigned to a shift
    async fn shift_assignment_count(&self, shift_id: i64) -> Result<usize, HrApiError>;

    /// Fetch this month's hours and consecutive working days for an employee
    async fn get_employee_stats(&self, employee_id: i64) -> Result<EmployeeStats, HrApiError>;
}
