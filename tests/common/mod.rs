//! Common test utilities for integration tests
//!
//! Provides an in-memory `HrDirectory` with per-method call counters and a
//! fixture swap whose checks all pass.

#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use swapguard::domain::models::{
    Availability, Employee, EmployeeStats, FatigueScore, MonthStats, Shift, SwapValidationRequest,
};
use swapguard::infrastructure::narrative::DisabledNarrator;
use swapguard::services::{ResponseCache, SwapValidationService};
use swapguard::{Config, HrApiError, HrDirectory};

pub const REQUESTER_ID: i64 = 1;
pub const TARGET_ID: i64 = 2;
pub const REQUESTER_SHIFT_ID: i64 = 10;
pub const TARGET_SHIFT_ID: i64 = 20;

#[derive(Debug, Default)]
pub struct CallCounts {
    pub employee: AtomicUsize,
    pub shift: AtomicUsize,
    pub availability: AtomicUsize,
    pub fatigue: AtomicUsize,
    pub assignments: AtomicUsize,
    pub stats: AtomicUsize,
}

impl CallCounts {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// In-memory HR system. Missing records answer 404.
#[derive(Debug, Default)]
pub struct FakeDirectory {
    pub employees: HashMap<i64, Employee>,
    pub shifts: HashMap<i64, Shift>,
    pub availability: HashMap<i64, Availability>,
    pub fatigue: HashMap<i64, FatigueScore>,
    pub assignments: HashMap<i64, usize>,
    pub stats: HashMap<i64, EmployeeStats>,
    pub fail_fatigue: bool,
    pub fail_availability: bool,
    pub fail_assignments: bool,
    pub fail_stats: bool,
    pub panic_on_shift: bool,
    pub calls: CallCounts,
}

fn not_found(what: &str, id: i64) -> HrApiError {
    HrApiError::Http {
        status: StatusCode::NOT_FOUND,
        body: format!("{what} {id} not found"),
    }
}

fn unavailable(service: &str) -> HrApiError {
    HrApiError::Http {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: format!("{service} service down"),
    }
}

fn employee(id: i64, name: &str) -> Employee {
    Employee {
        id,
        full_name: Some(name.to_string()),
    }
}

pub fn shift(id: i64, date: &str, kind: &str, start: &str, end: &str, required: u32) -> Shift {
    Shift {
        id,
        shift_date: Some(date.to_string()),
        shift_type: Some(kind.to_string()),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        required_staff_count: Some(required),
    }
}

fn score(total: i64) -> FatigueScore {
    FatigueScore {
        total_score: total,
        risk_level: Some("low".to_string()),
    }
}

fn stats(hours: f64, days: u32) -> EmployeeStats {
    EmployeeStats {
        this_month_stats: MonthStats {
            total_hours: hours,
            consecutive_days: days,
        },
    }
}

impl FakeDirectory {
    /// Two day shifts three days apart; both employees free, rested and
    /// well within every limit. Projected fatigue is 40 and 45.
    pub fn passing_swap() -> Self {
        Self {
            employees: HashMap::from([
                (REQUESTER_ID, employee(REQUESTER_ID, "Alice Martin")),
                (TARGET_ID, employee(TARGET_ID, "Bob Chen")),
            ]),
            shifts: HashMap::from([
                (
                    REQUESTER_SHIFT_ID,
                    shift(REQUESTER_SHIFT_ID, "2026-03-02", "day", "08:00:00", "16:00:00", 2),
                ),
                (
                    TARGET_SHIFT_ID,
                    shift(TARGET_SHIFT_ID, "2026-03-05", "day", "08:00:00", "16:00:00", 2),
                ),
            ]),
            availability: HashMap::from([
                (
                    REQUESTER_ID,
                    Availability {
                        is_available: true,
                        reason: None,
                    },
                ),
                (
                    TARGET_ID,
                    Availability {
                        is_available: true,
                        reason: None,
                    },
                ),
            ]),
            fatigue: HashMap::from([(REQUESTER_ID, score(38)), (TARGET_ID, score(43))]),
            assignments: HashMap::from([(REQUESTER_SHIFT_ID, 2), (TARGET_SHIFT_ID, 2)]),
            stats: HashMap::from([(REQUESTER_ID, stats(40.0, 3)), (TARGET_ID, stats(32.0, 2))]),
            ..Self::default()
        }
    }
}

#[async_trait]
impl HrDirectory for FakeDirectory {
    async fn get_employee(&self, employee_id: i64) -> Result<Employee, HrApiError> {
        self.calls.employee.fetch_add(1, Ordering::SeqCst);
        self.employees
            .get(&employee_id)
            .cloned()
            .ok_or_else(|| not_found("employee", employee_id))
    }

    async fn get_shift(&self, shift_id: i64) -> Result<Shift, HrApiError> {
        self.calls.shift.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_shift {
            panic!("shift lookup exploded");
        }
        self.shifts
            .get(&shift_id)
            .cloned()
            .ok_or_else(|| not_found("shift", shift_id))
    }

    async fn get_availability(
        &self,
        employee_id: i64,
        _date: &str,
    ) -> Result<Option<Availability>, HrApiError> {
        self.calls.availability.fetch_add(1, Ordering::SeqCst);
        if self.fail_availability {
            return Err(unavailable("availability"));
        }
        Ok(self.availability.get(&employee_id).cloned())
    }

    async fn get_fatigue_score(&self, employee_id: i64) -> Result<FatigueScore, HrApiError> {
        self.calls.fatigue.fetch_add(1, Ordering::SeqCst);
        if self.fail_fatigue {
            return Err(unavailable("fatigue"));
        }
        self.fatigue
            .get(&employee_id)
            .cloned()
            .ok_or_else(|| not_found("fatigue score", employee_id))
    }

    async fn shift_assignment_count(&self, shift_id: i64) -> Result<usize, HrApiError> {
        self.calls.assignments.fetch_add(1, Ordering::SeqCst);
        if self.fail_assignments {
            return Err(unavailable("assignments"));
        }
        Ok(self.assignments.get(&shift_id).copied().unwrap_or(0))
    }

    async fn get_employee_stats(&self, employee_id: i64) -> Result<EmployeeStats, HrApiError> {
        self.calls.stats.fetch_add(1, Ordering::SeqCst);
        if self.fail_stats {
            return Err(unavailable("statistics"));
        }
        self.stats
            .get(&employee_id)
            .cloned()
            .ok_or_else(|| not_found("stats", employee_id))
    }
}

pub fn swap_request() -> SwapValidationRequest {
    SwapValidationRequest {
        swap_id: 99,
        requester_id: REQUESTER_ID,
        requester_shift_id: REQUESTER_SHIFT_ID,
        target_employee_id: TARGET_ID,
        target_shift_id: TARGET_SHIFT_ID,
        swap_reason: Some("family event".to_string()),
    }
}

/// A service over `directory` with default rules and no narrative provider.
pub fn service_over(directory: Arc<FakeDirectory>) -> SwapValidationService {
    let config = Config::default();
    SwapValidationService::new(
        directory,
        Arc::new(DisabledNarrator),
        &config.rules,
        Arc::new(ResponseCache::from_config(&config.cache)),
    )
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
