//! Schedule rules (S-001 .. S-008)
//!
//! Per-schedule checks run first in registration order; pairwise overlap
//! detection between active schedules sharing a display runs afterwards.
//! The "display with neither schedule nor playlist" condition is owned by
//! D-001 in the display category and is not re-emitted here.

use chrono::{NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::models::{Display, Playlist, Schedule, Severity, ValidationIssue, ValidationResult};

use super::overlap::schedules_overlap;

/// Shared lookups built once per evaluation
struct ScheduleCtx<'a> {
    today: NaiveDate,
    display_ids: HashSet<&'a str>,
    playlists: HashMap<&'a str, &'a Playlist>,
}

type ScheduleRule = for<'a> fn(&Schedule, &ScheduleCtx<'a>) -> Option<ValidationIssue>;

const RULES: &[ScheduleRule] = &[
    s002_end_date_passed,
    s003_unknown_display,
    s004_empty_target_playlist,
    s005_crosses_midnight,
];

/// Evaluate the schedule rule catalogue against a snapshot
pub fn evaluate(
    schedules: &[Schedule],
    displays: &[Display],
    playlists: &[Playlist],
) -> ValidationResult {
    let started = Instant::now();
    let mut result = ValidationResult::new("schedule");

    let ctx = ScheduleCtx {
        today: Utc::now().date_naive(),
        display_ids: displays.iter().map(|d| d.id.as_str()).collect(),
        playlists: playlists.iter().map(|p| (p.id.as_str(), p)).collect(),
    };

    for schedule in schedules {
        for rule in RULES {
            if let Some(issue) = rule(schedule, &ctx) {
                result.issues.push(issue);
            }
        }
    }

    detect_overlaps(schedules, &mut result.issues);

    result
        .stats
        .insert("scheduleCount".to_string(), schedules.len() as f64);
    result
        .stats
        .insert("issueCount".to_string(), result.issues.len() as f64);
    result.duration_ms = started.elapsed().as_millis() as u64;
    result
}

/// S-002: active schedule whose end date has passed
fn s002_end_date_passed(schedule: &Schedule, ctx: &ScheduleCtx<'_>) -> Option<ValidationIssue> {
    if !schedule.active() {
        return None;
    }
    let end = schedule.end_date?;
    if end >= ctx.today {
        return None;
    }

    Some(ValidationIssue::new(
        "S-002",
        Severity::Warning,
        "schedule",
        &schedule.id,
        schedule.display_name(),
        format!("Schedule is active but ended on {end}"),
        "Deactivate the schedule or extend its end date",
    ))
}

/// S-003: schedule targets a display id absent from the snapshot
fn s003_unknown_display(schedule: &Schedule, ctx: &ScheduleCtx<'_>) -> Option<ValidationIssue> {
    let display_id = schedule.display_id.as_deref()?;
    if ctx.display_ids.contains(display_id) {
        return None;
    }

    Some(ValidationIssue::new(
        "S-003",
        Severity::Warning,
        "schedule",
        &schedule.id,
        schedule.display_name(),
        format!("Schedule targets unknown display \"{display_id}\""),
        "Point the schedule at an existing display or delete it",
    ))
}

/// S-004: target playlist is empty
fn s004_empty_target_playlist(
    schedule: &Schedule,
    ctx: &ScheduleCtx<'_>,
) -> Option<ValidationIssue> {
    let playlist_id = schedule.playlist_id.as_deref()?;
    let playlist = ctx.playlists.get(playlist_id)?;
    if !playlist.is_empty() {
        return None;
    }

    Some(ValidationIssue::new(
        "S-004",
        Severity::Warning,
        "schedule",
        &schedule.id,
        schedule.display_name(),
        format!("Target playlist \"{}\" has no items", playlist.display_name()),
        "Add content to the playlist before the schedule activates",
    ))
}

/// S-005: startTime lexicographically after endTime
///
/// A window like 22:00-02:00 crosses midnight; the player semantics for
/// such windows are undefined, so it is flagged for an explicit split
/// rather than silently corrected.
fn s005_crosses_midnight(schedule: &Schedule, _ctx: &ScheduleCtx<'_>) -> Option<ValidationIssue> {
    let start = schedule.start_time.as_deref()?;
    let end = schedule.end_time.as_deref()?;
    if start <= end {
        return None;
    }

    Some(ValidationIssue::new(
        "S-005",
        Severity::Warning,
        "schedule",
        &schedule.id,
        schedule.display_name(),
        format!("Time window {start}-{end} crosses midnight"),
        "Split into two schedules, one up to 23:59 and one from 00:00",
    ))
}

/// Pairwise overlap detection between active schedules sharing a display
///
/// Every overlapping pair yields one S-001 informational issue; when both
/// schedules carry the same explicit priority the tie-break is ambiguous
/// and an S-008 warning is emitted as well.
fn detect_overlaps(schedules: &[Schedule], issues: &mut Vec<ValidationIssue>) {
    let mut by_display: HashMap<&str, Vec<&Schedule>> = HashMap::new();
    for schedule in schedules.iter().filter(|s| s.active()) {
        if let Some(display_id) = schedule.display_id.as_deref() {
            by_display.entry(display_id).or_default().push(schedule);
        }
    }

    let mut display_ids: Vec<&str> = by_display.keys().copied().collect();
    display_ids.sort_unstable();

    for display_id in display_ids {
        let group = &by_display[display_id];
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                let (a, b) = (group[i], group[j]);
                if !schedules_overlap(a, b) {
                    continue;
                }

                issues.push(ValidationIssue::new(
                    "S-001",
                    Severity::Info,
                    "schedule",
                    &a.id,
                    a.display_name(),
                    format!(
                        "Overlaps with schedule \"{}\" on display \"{display_id}\"",
                        b.display_name()
                    ),
                    "Verify the intended playback priority for the shared window",
                ));

                if let (Some(pa), Some(pb)) = (a.priority, b.priority) {
                    if pa == pb {
                        issues.push(ValidationIssue::new(
                            "S-008",
                            Severity::Warning,
                            "schedule",
                            &a.id,
                            a.display_name(),
                            format!(
                                "Overlaps with schedule \"{}\" at identical priority {pa}, \
                                 playback order is ambiguous",
                                b.display_name()
                            ),
                            "Give one of the schedules a distinct priority",
                        ));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn active_schedule(id: &str, display_id: &str) -> Schedule {
        Schedule {
            id: id.to_string(),
            name: Some(format!("Schedule {id}")),
            display_id: Some(display_id.to_string()),
            is_active: Some(true),
            ..Default::default()
        }
    }

    fn display(id: &str) -> Display {
        Display {
            id: id.to_string(),
            ..Default::default()
        }
    }

    fn days(tokens: &[&str]) -> Option<Vec<serde_json::Value>> {
        Some(
            tokens
                .iter()
                .map(|t| serde_json::Value::String(t.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_s002_expired_active_schedule() {
        let mut s = active_schedule("s1", "d1");
        s.end_date = Some((Utc::now() - Duration::days(3)).date_naive());

        let result = evaluate(&[s], &[display("d1")], &[]);
        assert!(result.issues.iter().any(|i| i.rule == "S-002"));
    }

    #[test]
    fn test_s002_inactive_schedule_ignored() {
        let mut s = active_schedule("s1", "d1");
        s.is_active = Some(false);
        s.end_date = Some((Utc::now() - Duration::days(3)).date_naive());

        let result = evaluate(&[s], &[display("d1")], &[]);
        assert!(!result.issues.iter().any(|i| i.rule == "S-002"));
    }

    #[test]
    fn test_s003_unknown_display_target() {
        let s = active_schedule("s1", "ghost");
        let result = evaluate(&[s], &[display("d1")], &[]);

        let issue = result.issues.iter().find(|i| i.rule == "S-003").unwrap();
        assert!(issue.message.contains("ghost"));
    }

    #[test]
    fn test_s004_empty_target_playlist() {
        let mut s = active_schedule("s1", "d1");
        s.playlist_id = Some("p1".to_string());
        let empty = Playlist {
            id: "p1".to_string(),
            ..Default::default()
        };

        let result = evaluate(&[s], &[display("d1")], &[empty]);
        assert!(result.issues.iter().any(|i| i.rule == "S-004"));
    }

    #[test]
    fn test_s005_midnight_crossing_window() {
        let mut s = active_schedule("s1", "d1");
        s.start_time = Some("22:00".to_string());
        s.end_time = Some("02:00".to_string());

        let result = evaluate(&[s], &[display("d1")], &[]);
        let issue = result.issues.iter().find(|i| i.rule == "S-005").unwrap();
        assert!(issue.message.contains("22:00-02:00"));
    }

    #[test]
    fn test_priority_tie_produces_both_s001_and_s008() {
        // Schedule A: Mon-Fri 09:00-12:00, schedule B: Mon 10:00-11:00,
        // both active on display X with priority 1
        let mut a = active_schedule("sa", "x");
        a.days_of_week = days(&["mon", "tue", "wed", "thu", "fri"]);
        a.start_time = Some("09:00".to_string());
        a.end_time = Some("12:00".to_string());
        a.priority = Some(1);

        let mut b = active_schedule("sb", "x");
        b.days_of_week = days(&["mon"]);
        b.start_time = Some("10:00".to_string());
        b.end_time = Some("11:00".to_string());
        b.priority = Some(1);

        let result = evaluate(&[a, b], &[display("x")], &[]);

        let s001: Vec<_> = result.issues.iter().filter(|i| i.rule == "S-001").collect();
        let s008: Vec<_> = result.issues.iter().filter(|i| i.rule == "S-008").collect();
        assert_eq!(s001.len(), 1);
        assert_eq!(s008.len(), 1);
        assert_eq!(s001[0].severity, Severity::Info);
        assert_eq!(s008[0].severity, Severity::Warning);
    }

    #[test]
    fn test_distinct_priorities_skip_s008() {
        let mut a = active_schedule("sa", "x");
        a.priority = Some(1);
        let mut b = active_schedule("sb", "x");
        b.priority = Some(2);

        let result = evaluate(&[a, b], &[display("x")], &[]);
        assert!(result.issues.iter().any(|i| i.rule == "S-001"));
        assert!(!result.issues.iter().any(|i| i.rule == "S-008"));
    }

    #[test]
    fn test_overlap_requires_shared_display() {
        let a = active_schedule("sa", "x");
        let b = active_schedule("sb", "y");

        let result = evaluate(&[a, b], &[display("x"), display("y")], &[]);
        assert!(!result.issues.iter().any(|i| i.rule == "S-001"));
    }

    #[test]
    fn test_inactive_schedules_skip_overlap_detection() {
        let a = active_schedule("sa", "x");
        let mut b = active_schedule("sb", "x");
        b.is_active = Some(false);

        let result = evaluate(&[a, b], &[display("x")], &[]);
        assert!(!result.issues.iter().any(|i| i.rule == "S-001"));
    }
}
