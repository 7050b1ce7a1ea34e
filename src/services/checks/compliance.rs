use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::{CheckStep, REQUESTER_FALLBACK_NAME, TARGET_FALLBACK_NAME};
use crate::domain::models::{
    CheckName, CheckResult, ComplianceRules, EmployeeStats, Severity, Shift, SwapContext,
    SwapValidationRequest,
};
use crate::domain::ports::HrDirectory;

/// Hours assumed for a shift whose times cannot be read.
const DEFAULT_SHIFT_HOURS: f64 = 8.0;

/// Working-time rules: rest periods, shift length, night work, monthly
/// hours and consecutive days.
pub struct ComplianceCheck {
    directory: Arc<dyn HrDirectory>,
    rules: ComplianceRules,
}

#[derive(Debug, Default)]
struct Findings {
    checks_performed: Vec<&'static str>,
    violations: Vec<String>,
    warnings: Vec<String>,
}

/// Hours between the end of the old shift and the start of the new one, if
/// both can be placed in time.
#[allow(clippy::cast_precision_loss)]
fn rest_hours(old_shift: &Shift, new_shift: &Shift) -> Option<f64> {
    let old_end = old_shift.ends_at()?;
    let new_start = new_shift.starts_at()?;
    Some(((new_start - old_end).num_seconds() as f64 / 3600.0).abs())
}

/// Length of a shift in hours; overnight shifts wrap past midnight.
#[allow(clippy::cast_precision_loss)]
fn shift_hours(shift: &Shift) -> f64 {
    match (shift.starts_at(), shift.ends_at()) {
        (Some(start), Some(end)) => {
            let hours = (end - start).num_seconds() as f64 / 3600.0;
            if hours < 0.0 {
                hours + 24.0
            } else {
                hours
            }
        }
        _ => DEFAULT_SHIFT_HOURS,
    }
}

impl ComplianceCheck {
    pub fn new(directory: Arc<dyn HrDirectory>, rules: ComplianceRules) -> Self {
        Self { directory, rules }
    }

    fn check_rest(&self, findings: &mut Findings, name: &str, old_shift: &Shift, new_shift: &Shift) {
        let min_rest = self.rules.min_rest_between_shifts_hours;
        if let Some(rest) = rest_hours(old_shift, new_shift) {
            if rest > 0.0 && rest < min_rest {
                findings.violations.push(format!(
                    "{name} would have only {rest:.1}h rest (minimum: {min_rest}h required)"
                ));
            }
        }
    }

    fn check_daily_hours(&self, findings: &mut Findings, name: &str, new_shift: &Shift) {
        let hours = shift_hours(new_shift);
        let max_daily = self.rules.max_daily_hours;
        if hours > max_daily {
            findings.warnings.push(format!(
                "{name}'s new shift is {hours:.1}h (exceeds {max_daily}h daily limit)"
            ));
        }
    }

    fn check_monthly(&self, findings: &mut Findings, name: &str, stats: &EmployeeStats) {
        let month = &stats.this_month_stats;
        let max_weekly = self.rules.max_weekly_hours;
        let max_consecutive = self.rules.max_consecutive_days;

        if month.total_hours >= max_weekly {
            findings.warnings.push(format!(
                "{name} has worked {}h this month (approaching {max_weekly}h weekly limit)",
                month.total_hours
            ));
        }
        if month.consecutive_days >= max_consecutive {
            findings.violations.push(format!(
                "{name} has worked {} consecutive days (max: {max_consecutive})",
                month.consecutive_days
            ));
        }
    }

    fn details(&self, findings: &Findings) -> Value {
        json!({
            "checks_performed": findings.checks_performed,
            "violations": findings.violations,
            "warnings": findings.warnings,
            "rules_applied": self.rules,
        })
    }
}

#[async_trait]
impl CheckStep for ComplianceCheck {
    fn name(&self) -> CheckName {
        CheckName::Compliance
    }

    async fn evaluate(&self, request: &SwapValidationRequest, context: &SwapContext) -> CheckResult {
        let requester_name = context.requester.name_or(REQUESTER_FALLBACK_NAME);
        let target_name = context.target.name_or(TARGET_FALLBACK_NAME);
        let requester_shift = &context.requester_shift;
        let target_shift = &context.target_shift;
        let mut findings = Findings::default();

        // After the swap the requester works the target shift and vice versa.
        findings.checks_performed.push("minimum_rest_period");
        self.check_rest(&mut findings, requester_name, requester_shift, target_shift);
        self.check_rest(&mut findings, target_name, target_shift, requester_shift);

        findings.checks_performed.push("max_daily_hours");
        self.check_daily_hours(&mut findings, requester_name, target_shift);
        self.check_daily_hours(&mut findings, target_name, requester_shift);

        findings.checks_performed.push("night_shift_rules");
        for (name, new_shift) in [(requester_name, target_shift), (target_name, requester_shift)] {
            if new_shift.kind() == "night" {
                findings.warnings.push(format!(
                    "{name} will be switching to a night shift - verify they are eligible for night work"
                ));
            }
        }

        findings.checks_performed.push("weekly_hours_and_consecutive_days");
        let (requester_stats, target_stats) = futures::join!(
            self.directory.get_employee_stats(request.requester_id),
            self.directory.get_employee_stats(request.target_employee_id),
        );

        let stats_error = match (requester_stats, target_stats) {
            (Ok(requester), Ok(target)) => {
                self.check_monthly(&mut findings, requester_name, &requester);
                self.check_monthly(&mut findings, target_name, &target);
                None
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "Employee statistics lookup failed");
                Some(err)
            }
        };

        info!(
            violations = findings.violations.len(),
            warnings = findings.warnings.len(),
            stats_available = stats_error.is_none(),
            "Compliance check complete"
        );

        let mut details = self.details(&findings);
        if let Some(err) = &stats_error {
            details["error"] = json!(err.to_string());
            details["needs_manual_review"] = json!(true);
        }

        // Violations found from the shifts alone still reject when the
        // monthly statistics are missing.
        if !findings.violations.is_empty() {
            CheckResult::new(
                CheckName::Compliance,
                false,
                Severity::Hard,
                format!("Compliance violations: {}", findings.violations.join("; ")),
                details,
            )
        } else if let Some(err) = stats_error {
            CheckResult::new(
                CheckName::Compliance,
                true,
                Severity::Soft,
                format!("Could not fully verify compliance: {err}"),
                details,
            )
        } else if !findings.warnings.is_empty() {
            CheckResult::new(
                CheckName::Compliance,
                true,
                Severity::Soft,
                format!("Compliance passed with warnings: {}", findings.warnings.join("; ")),
                details,
            )
        } else {
            CheckResult::new(
                CheckName::Compliance,
                true,
                Severity::Hard,
                "All compliance checks passed",
                details,
            )
        }
    }
}
