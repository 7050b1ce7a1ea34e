//! Records returned by the upstream HR system.
//!
//! Every field the HR API may omit is optional or defaulted so that a
//! partially populated record still deserializes; the checks decide what a
//! missing value means.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// An employee record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Employee {
    /// Display name, or `fallback` when the record has none.
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.full_name.as_deref().unwrap_or(fallback)
    }
}

/// A scheduled shift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub shift_date: Option<String>,
    #[serde(default)]
    pub shift_type: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub required_staff_count: Option<u32>,
}

impl Shift {
    /// Shift type, treating a missing value as a day shift.
    pub fn kind(&self) -> &str {
        self.shift_type.as_deref().unwrap_or("day")
    }

    /// Date as sent by the API, empty when absent.
    pub fn date_label(&self) -> &str {
        self.shift_date.as_deref().unwrap_or("")
    }

    /// Calendar date of the shift. Accepts plain dates and ISO timestamps.
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = self.shift_date.as_deref()?;
        let day = raw.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// Start of the shift on its calendar date.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        Some(self.date()?.and_time(parse_time(self.start_time.as_deref())?))
    }

    /// End of the shift on its calendar date (not rolled past midnight).
    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        Some(self.date()?.and_time(parse_time(self.end_time.as_deref())?))
    }

    /// Staff required on this shift; one when unspecified.
    pub fn required_staff(&self) -> u32 {
        self.required_staff_count.unwrap_or(1)
    }
}

fn parse_time(raw: Option<&str>) -> Option<NaiveTime> {
    let raw = raw.unwrap_or("00:00:00");
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Availability of an employee on a given date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Current fatigue score of an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatigueScore {
    #[serde(default)]
    pub total_score: i64,
    #[serde(default)]
    pub risk_level: Option<String>,
}

/// Monthly work statistics for an employee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeStats {
    #[serde(default)]
    pub this_month_stats: MonthStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthStats {
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub consecutive_days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(date: &str, start: &str, end: &str) -> Shift {
        Shift {
            shift_date: Some(date.to_string()),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_shift_date_accepts_timestamps() {
        let s = shift("2026-03-02T00:00:00.000000Z", "08:00:00", "16:00:00");
        assert_eq!(s.date(), NaiveDate::from_ymd_opt(2026, 3, 2));
    }

    #[test]
    fn test_shift_times_with_and_without_seconds() {
        let s = shift("2026-03-02", "08:00", "16:30:00");
        assert_eq!(
            s.starts_at().map(|t| t.time()),
            NaiveTime::from_hms_opt(8, 0, 0)
        );
        assert_eq!(
            s.ends_at().map(|t| t.time()),
            NaiveTime::from_hms_opt(16, 30, 0)
        );
    }

    #[test]
    fn test_invalid_date_yields_none() {
        let s = shift("not-a-date", "08:00", "16:00");
        assert!(s.date().is_none());
        assert!(s.starts_at().is_none());
    }

    #[test]
    fn test_defaults() {
        let s: Shift = serde_json::from_str(r#"{"id": 4}"#).unwrap();
        assert_eq!(s.kind(), "day");
        assert_eq!(s.required_staff(), 1);

        let stats: EmployeeStats = serde_json::from_str("{}").unwrap();
        assert_eq!(stats.this_month_stats.consecutive_days, 0);
    }
}
