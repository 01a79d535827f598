//! Temporal overlap detection between two schedules
//!
//! Two schedules overlap iff all three dimensions intersect: date range,
//! day-of-week set, and time-of-day interval. A dimension left unspecified
//! on either side is treated as unconstrained, deliberately: a schedule
//! without day-of-week data applies every day, not no days.

use crate::models::Schedule;
use chrono::NaiveDate;

/// True iff the effective windows of the two schedules intersect
///
/// Short-circuits on the first dimension that fails. Symmetric by
/// construction: every check treats `a` and `b` identically.
pub fn schedules_overlap(a: &Schedule, b: &Schedule) -> bool {
    if !dates_intersect(a, b) {
        return false;
    }
    if !days_intersect(a, b) {
        return false;
    }
    times_intersect(a, b)
}

/// Closed `[startDate, endDate]` interval intersection
///
/// A missing bound is unbounded on that side.
fn dates_intersect(a: &Schedule, b: &Schedule) -> bool {
    let starts_no_later = |start: Option<NaiveDate>, end: Option<NaiveDate>| match (start, end) {
        (Some(s), Some(e)) => s <= e,
        _ => true,
    };

    starts_no_later(a.start_date, b.end_date) && starts_no_later(b.start_date, a.end_date)
}

/// Day-of-week set intersection on normalized string tokens
///
/// A schedule without day data applies every day.
fn days_intersect(a: &Schedule, b: &Schedule) -> bool {
    match (a.normalized_days(), b.normalized_days()) {
        (Some(da), Some(db)) => !da.is_disjoint(&db),
        _ => true,
    }
}

/// Half-open `[startTime, endTime)` interval intersection
///
/// Lexicographic comparison is correct because times are zero-padded
/// "HH:MM" strings. Schedules missing either time run all day.
fn times_intersect(a: &Schedule, b: &Schedule) -> bool {
    match (&a.start_time, &a.end_time, &b.start_time, &b.end_time) {
        (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) => {
            a_start < b_end && b_start < a_end
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(
        days: Option<&[&str]>,
        start_time: Option<&str>,
        end_time: Option<&str>,
    ) -> Schedule {
        Schedule {
            id: "s".to_string(),
            days_of_week: days.map(|d| {
                d.iter()
                    .map(|s| serde_json::Value::String(s.to_string()))
                    .collect()
            }),
            start_time: start_time.map(str::to_string),
            end_time: end_time.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_overlapping_time_windows() {
        let a = schedule(Some(&["mon"]), Some("09:00"), Some("12:00"));
        let b = schedule(Some(&["mon"]), Some("10:00"), Some("11:00"));
        assert!(schedules_overlap(&a, &b));
    }

    #[test]
    fn test_adjacent_time_windows_do_not_overlap() {
        // Half-open intervals: [09:00, 12:00) and [12:00, 14:00) touch but
        // never run simultaneously
        let a = schedule(Some(&["mon"]), Some("09:00"), Some("12:00"));
        let b = schedule(Some(&["mon"]), Some("12:00"), Some("14:00"));
        assert!(!schedules_overlap(&a, &b));
    }

    #[test]
    fn test_disjoint_days_do_not_overlap() {
        let a = schedule(Some(&["mon", "tue"]), Some("09:00"), Some("12:00"));
        let b = schedule(Some(&["sat", "sun"]), Some("09:00"), Some("12:00"));
        assert!(!schedules_overlap(&a, &b));
    }

    #[test]
    fn test_missing_days_means_every_day() {
        let a = schedule(None, Some("09:00"), Some("12:00"));
        let b = schedule(Some(&["mon"]), Some("10:00"), Some("11:00"));
        assert!(schedules_overlap(&a, &b));
    }

    #[test]
    fn test_missing_times_means_all_day() {
        let a = schedule(Some(&["mon"]), None, None);
        let b = schedule(Some(&["mon"]), Some("10:00"), Some("11:00"));
        assert!(schedules_overlap(&a, &b));
    }

    #[test]
    fn test_disjoint_date_ranges() {
        let mut a = schedule(None, None, None);
        a.start_date = NaiveDate::from_ymd_opt(2026, 1, 1);
        a.end_date = NaiveDate::from_ymd_opt(2026, 1, 31);

        let mut b = schedule(None, None, None);
        b.start_date = NaiveDate::from_ymd_opt(2026, 2, 1);
        b.end_date = NaiveDate::from_ymd_opt(2026, 2, 28);

        assert!(!schedules_overlap(&a, &b));
    }

    #[test]
    fn test_unbounded_date_range_intersects() {
        let mut a = schedule(None, None, None);
        a.start_date = NaiveDate::from_ymd_opt(2026, 1, 1);
        // no end date: unbounded forward

        let mut b = schedule(None, None, None);
        b.start_date = NaiveDate::from_ymd_opt(2030, 6, 1);
        b.end_date = NaiveDate::from_ymd_opt(2030, 6, 30);

        assert!(schedules_overlap(&a, &b));
    }

    #[test]
    fn test_symmetry() {
        let cases = vec![
            (
                schedule(Some(&["mon", "wed"]), Some("08:00"), Some("10:00")),
                schedule(Some(&["wed"]), Some("09:30"), Some("12:00")),
            ),
            (
                schedule(None, None, None),
                schedule(Some(&["fri"]), Some("18:00"), Some("23:00")),
            ),
            (
                schedule(Some(&["sat"]), Some("06:00"), Some("07:00")),
                schedule(Some(&["sun"]), Some("06:00"), Some("07:00")),
            ),
        ];

        for (a, b) in cases {
            assert_eq!(schedules_overlap(&a, &b), schedules_overlap(&b, &a));
        }
    }

    #[test]
    fn test_day_tokens_compared_as_normalized_strings() {
        let a = schedule(Some(&["MON"]), Some("09:00"), Some("12:00"));
        let b = schedule(Some(&["mon"]), Some("10:00"), Some("11:00"));
        assert!(schedules_overlap(&a, &b));
    }
}
