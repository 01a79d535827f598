//! Display and playlist rules (D-001 .. D-005, P-001 .. P-002)

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::models::{Content, Display, Playlist, Schedule, Severity, ValidationIssue, ValidationResult};

/// How long a display may stay silent before it counts as offline
const HEARTBEAT_GRACE_HOURS: i64 = 24;

/// Shared lookups built once per evaluation
struct DisplayCtx<'a> {
    now: DateTime<Utc>,
    playlists: HashMap<&'a str, &'a Playlist>,
    contents: HashMap<&'a str, &'a Content>,
    /// Display ids targeted directly by at least one schedule
    scheduled_displays: HashSet<&'a str>,
    /// Playlist ids assigned to a display or referenced by a schedule
    assigned_playlists: HashSet<&'a str>,
}

type DisplayRule = for<'a> fn(&Display, &DisplayCtx<'a>) -> Option<ValidationIssue>;
type PlaylistRule = for<'a> fn(&Playlist, &DisplayCtx<'a>) -> Option<ValidationIssue>;

const DISPLAY_RULES: &[DisplayRule] = &[
    d001_nothing_to_play,
    d002_stale_heartbeat,
    d003_missing_resolution,
    d004_empty_assigned_playlist,
    d005_error_flag,
];

const PLAYLIST_RULES: &[PlaylistRule] = &[p001_empty_playlist, p002_stale_content_reference];

/// Evaluate display and playlist rules against a snapshot
pub fn evaluate(
    displays: &[Display],
    playlists: &[Playlist],
    schedules: &[Schedule],
    contents: &[Content],
) -> ValidationResult {
    let started = Instant::now();
    let mut result = ValidationResult::new("display");

    let ctx = DisplayCtx {
        now: Utc::now(),
        playlists: playlists.iter().map(|p| (p.id.as_str(), p)).collect(),
        contents: contents.iter().map(|c| (c.id.as_str(), c)).collect(),
        scheduled_displays: schedules
            .iter()
            .filter_map(|s| s.display_id.as_deref())
            .collect(),
        assigned_playlists: displays
            .iter()
            .filter_map(|d| d.current_playlist_id.as_deref())
            .chain(schedules.iter().filter_map(|s| s.playlist_id.as_deref()))
            .collect(),
    };

    for display in displays {
        for rule in DISPLAY_RULES {
            if let Some(issue) = rule(display, &ctx) {
                result.issues.push(issue);
            }
        }
    }

    for playlist in playlists {
        for rule in PLAYLIST_RULES {
            if let Some(issue) = rule(playlist, &ctx) {
                result.issues.push(issue);
            }
        }
    }

    result
        .stats
        .insert("displayCount".to_string(), displays.len() as f64);
    result
        .stats
        .insert("playlistCount".to_string(), playlists.len() as f64);
    result
        .stats
        .insert("issueCount".to_string(), result.issues.len() as f64);
    result.duration_ms = started.elapsed().as_millis() as u64;
    result
}

/// D-001: no direct playlist and no schedule targeting the display
///
/// A display in this state renders a blank screen, hence critical.
fn d001_nothing_to_play(display: &Display, ctx: &DisplayCtx<'_>) -> Option<ValidationIssue> {
    if display.current_playlist_id.is_some() {
        return None;
    }
    if ctx.scheduled_displays.contains(display.id.as_str()) {
        return None;
    }

    Some(ValidationIssue::new(
        "D-001",
        Severity::Critical,
        "display",
        &display.id,
        display.display_name(),
        "Display has no playlist and no schedule, screen will be blank",
        "Assign a playlist directly or create a schedule targeting this display",
    ))
}

/// D-002: silent for more than 24 hours while not marked online
fn d002_stale_heartbeat(display: &Display, ctx: &DisplayCtx<'_>) -> Option<ValidationIssue> {
    let last_seen = display.last_seen_at?;
    if display.is_online() {
        return None;
    }
    if ctx.now - last_seen <= Duration::hours(HEARTBEAT_GRACE_HOURS) {
        return None;
    }

    Some(ValidationIssue::new(
        "D-002",
        Severity::Warning,
        "display",
        &display.id,
        display.display_name(),
        format!("Display last seen {}", last_seen.to_rfc3339()),
        "Check power and network at the display site",
    ))
}

/// D-003: resolution not reported (informational)
fn d003_missing_resolution(display: &Display, _ctx: &DisplayCtx<'_>) -> Option<ValidationIssue> {
    if display.resolution.as_deref().is_some_and(|r| !r.is_empty()) {
        return None;
    }

    Some(ValidationIssue::new(
        "D-003",
        Severity::Info,
        "display",
        &display.id,
        display.display_name(),
        "Display has not reported its resolution",
        "Content may render scaled; verify the player version",
    ))
}

/// D-004: assigned playlist has zero items
fn d004_empty_assigned_playlist(display: &Display, ctx: &DisplayCtx<'_>) -> Option<ValidationIssue> {
    let playlist_id = display.current_playlist_id.as_deref()?;
    let playlist = ctx.playlists.get(playlist_id)?;
    if !playlist.is_empty() {
        return None;
    }

    Some(ValidationIssue::new(
        "D-004",
        Severity::Critical,
        "display",
        &display.id,
        display.display_name(),
        format!(
            "Assigned playlist \"{}\" has no items, screen will be blank",
            playlist.display_name()
        ),
        "Add content to the playlist or assign a different one",
    ))
}

/// D-005: display carries an explicit error flag or message
fn d005_error_flag(display: &Display, _ctx: &DisplayCtx<'_>) -> Option<ValidationIssue> {
    let flagged = display.has_error == Some(true)
        || display.error_message.as_deref().is_some_and(|m| !m.is_empty());
    if !flagged {
        return None;
    }

    Some(ValidationIssue::new(
        "D-005",
        Severity::Warning,
        "display",
        &display.id,
        display.display_name(),
        format!(
            "Display reports an error: {}",
            display.error_message.as_deref().unwrap_or("(no message)")
        ),
        "Inspect the player logs on the device",
    ))
}

/// P-001: empty playlist; escalates to warning when actually assigned
fn p001_empty_playlist(playlist: &Playlist, ctx: &DisplayCtx<'_>) -> Option<ValidationIssue> {
    if !playlist.is_empty() {
        return None;
    }

    let assigned = ctx.assigned_playlists.contains(playlist.id.as_str());
    let severity = if assigned { Severity::Warning } else { Severity::Info };
    let message = if assigned {
        "Playlist is empty and assigned to a display or schedule"
    } else {
        "Playlist is empty"
    };

    Some(ValidationIssue::new(
        "P-001",
        severity,
        "playlist",
        &playlist.id,
        playlist.display_name(),
        message,
        "Add content items or delete the playlist",
    ))
}

/// P-002: items referencing archived or expired content
fn p002_stale_content_reference(
    playlist: &Playlist,
    ctx: &DisplayCtx<'_>,
) -> Option<ValidationIssue> {
    let stale = playlist
        .items
        .iter()
        .filter_map(|item| item.content_id.as_deref())
        .filter_map(|id| ctx.contents.get(id))
        .filter(|c| c.is_archived() || c.is_expired(ctx.now))
        .count();
    if stale == 0 {
        return None;
    }

    Some(ValidationIssue::new(
        "P-002",
        Severity::Warning,
        "playlist",
        &playlist.id,
        playlist.display_name(),
        format!("Playlist references {stale} archived or expired content item(s)"),
        "Remove or replace the stale items",
    ))
}
