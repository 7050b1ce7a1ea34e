use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use swapguard::domain::models::FatigueRules;
use swapguard::services::checks::fatigue_projection;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap_or_default()
}

fn project(current: i64, shift_type: &str, gap_days: Option<i64>) -> i64 {
    let old = base_date();
    let new = gap_days.map(|days| old + Duration::days(days));
    fatigue_projection(current, shift_type, new, Some(old), &FatigueRules::default())
}

proptest! {
    /// Property: the projection is a pure function of its inputs
    #[test]
    fn prop_projection_is_deterministic(
        current in 0i64..100,
        gap in proptest::option::of(-30i64..30),
        shift_type in prop::sample::select(vec!["day", "evening", "night", "on_call"]),
    ) {
        prop_assert_eq!(project(current, shift_type, gap), project(current, shift_type, gap));
    }

    /// Property: taking a shift never lowers fatigue
    #[test]
    fn prop_projection_never_decreases(
        current in 0i64..100,
        gap in proptest::option::of(-30i64..30),
        shift_type in prop::sample::select(vec!["day", "evening", "night", "on_call"]),
    ) {
        prop_assert!(project(current, shift_type, gap) >= current);
    }

    /// Property: for the same score and gap, night > evening > day
    #[test]
    fn prop_night_outweighs_evening_outweighs_day(
        current in 0i64..100,
        gap in proptest::option::of(-30i64..30),
    ) {
        let night = project(current, "night", gap);
        let evening = project(current, "evening", gap);
        let day = project(current, "day", gap);
        prop_assert!(night > evening, "night {} vs evening {}", night, evening);
        prop_assert!(evening > day, "evening {} vs day {}", evening, day);
    }

    /// Property: more days between the shifts never means more fatigue
    #[test]
    fn prop_longer_gap_never_costs_more(
        current in 0i64..100,
        shorter in 0i64..10,
        extra in 0i64..10,
    ) {
        let near = project(current, "night", Some(shorter));
        let far = project(current, "night", Some(shorter + extra));
        prop_assert!(far <= near);
    }
}

#[test]
fn test_unknown_gap_matches_same_day() {
    for current in [0, 31, 51, 80] {
        assert_eq!(project(current, "night", None), project(current, "night", Some(0)));
    }
}
