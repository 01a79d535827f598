//! Content library rules (C-001 .. C-007)
//!
//! All rules are defensive about missing fields: an absent field means the
//! rule does not fire, never a panic or an error.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Instant;
use url::Url;

use crate::models::{Content, Playlist, Severity, ValidationIssue, ValidationResult};

/// Internal scheme prefix accepted by the player alongside http(s)
const INTERNAL_SCHEME: &str = "content://";

/// Content types that are not expected to sit in a playlist
const ORPHAN_EXEMPT_TYPES: &[&str] = &["url"];

/// Size thresholds in bytes
const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_VIDEO_BYTES: u64 = 100 * 1024 * 1024;

/// Shared lookups built once per evaluation
struct ContentCtx {
    now: DateTime<Utc>,
    /// Content ids referenced by at least one playlist item
    referenced: HashSet<String>,
}

type ContentRule = fn(&Content, &ContentCtx) -> Option<ValidationIssue>;

/// Registration order fixes issue ordering for reproducible output
const RULES: &[ContentRule] = &[
    c001_invalid_url,
    c002_expired_content,
    c003_orphaned_content,
    c004_missing_thumbnail,
    c005_mime_type_mismatch,
    c006_non_positive_duration,
    c007_oversized_file,
];

/// Evaluate the content rule catalogue against a snapshot
pub fn evaluate(contents: &[Content], playlists: &[Playlist]) -> ValidationResult {
    let started = Instant::now();
    let mut result = ValidationResult::new("content");

    let ctx = ContentCtx {
        now: Utc::now(),
        referenced: playlists
            .iter()
            .flat_map(|p| p.items.iter())
            .filter_map(|item| item.content_id.clone())
            .collect(),
    };

    for content in contents {
        for rule in RULES {
            if let Some(issue) = rule(content, &ctx) {
                result.issues.push(issue);
            }
        }
    }

    result
        .stats
        .insert("contentCount".to_string(), contents.len() as f64);
    result
        .stats
        .insert("issueCount".to_string(), result.issues.len() as f64);
    result.duration_ms = started.elapsed().as_millis() as u64;
    result
}

/// C-001: URL scheme must be http(s) or the internal content scheme
fn c001_invalid_url(content: &Content, _ctx: &ContentCtx) -> Option<ValidationIssue> {
    let raw = content.url.as_deref()?;
    if raw.starts_with(INTERNAL_SCHEME) {
        return None;
    }

    let valid = Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if valid {
        return None;
    }

    Some(ValidationIssue::new(
        "C-001",
        Severity::Warning,
        "content",
        &content.id,
        content.display_name(),
        format!("URL is malformed or uses an unsupported scheme: {raw}"),
        "Re-upload the asset or fix the URL to use http(s)",
    ))
}

/// C-002: active content past its expiry timestamp
fn c002_expired_content(content: &Content, ctx: &ContentCtx) -> Option<ValidationIssue> {
    if !(content.is_active() && content.is_expired(ctx.now)) {
        return None;
    }

    Some(ValidationIssue::new(
        "C-002",
        Severity::Warning,
        "content",
        &content.id,
        content.display_name(),
        format!(
            "Content is active but expired at {}",
            content.expires_at.map(|e| e.to_rfc3339()).unwrap_or_default()
        ),
        "Archive the content or extend its expiry date",
    ))
}

/// C-003: content absent from every playlist (informational)
fn c003_orphaned_content(content: &Content, ctx: &ContentCtx) -> Option<ValidationIssue> {
    if ctx.referenced.contains(&content.id) {
        return None;
    }
    if let Some(t) = content.content_type.as_deref() {
        if ORPHAN_EXEMPT_TYPES.contains(&t) {
            return None;
        }
    }

    Some(ValidationIssue::new(
        "C-003",
        Severity::Info,
        "content",
        &content.id,
        content.display_name(),
        "Content is not used by any playlist",
        "Add it to a playlist or archive it to keep the library tidy",
    ))
}

/// C-004: image/video content without a thumbnail
fn c004_missing_thumbnail(content: &Content, _ctx: &ContentCtx) -> Option<ValidationIssue> {
    let content_type = content.content_type.as_deref()?;
    if !matches!(content_type, "image" | "video") {
        return None;
    }
    if content.thumbnail_url.as_deref().is_some_and(|t| !t.is_empty()) {
        return None;
    }

    Some(ValidationIssue::new(
        "C-004",
        Severity::Info,
        "content",
        &content.id,
        content.display_name(),
        format!("{content_type} content has no thumbnail"),
        "Regenerate the thumbnail so editors can preview the asset",
    ))
}

/// Expected MIME prefixes per declared content type
fn expected_mime_prefixes(content_type: &str) -> Option<&'static [&'static str]> {
    match content_type {
        "image" => Some(&["image/"]),
        "video" => Some(&["video/"]),
        "audio" => Some(&["audio/"]),
        "pdf" => Some(&["application/pdf"]),
        "html" => Some(&["text/html"]),
        _ => None,
    }
}

/// C-005: declared type disagrees with the MIME type prefix
fn c005_mime_type_mismatch(content: &Content, _ctx: &ContentCtx) -> Option<ValidationIssue> {
    let content_type = content.content_type.as_deref()?;
    let mime = content.mime_type.as_deref()?;
    let prefixes = expected_mime_prefixes(content_type)?;

    if prefixes.iter().any(|p| mime.starts_with(p)) {
        return None;
    }

    Some(ValidationIssue::new(
        "C-005",
        Severity::Warning,
        "content",
        &content.id,
        content.display_name(),
        format!("Declared type \"{content_type}\" does not match MIME type \"{mime}\""),
        "Fix the content type or re-upload the file with the right format",
    ))
}

/// C-006: non-positive duration for non-url content
fn c006_non_positive_duration(content: &Content, _ctx: &ContentCtx) -> Option<ValidationIssue> {
    let duration = content.duration?;
    if content.content_type.as_deref() == Some("url") || duration > 0.0 {
        return None;
    }

    Some(ValidationIssue::new(
        "C-006",
        Severity::Warning,
        "content",
        &content.id,
        content.display_name(),
        format!("Duration is {duration}, players will skip this item"),
        "Set a positive display duration",
    ))
}

/// C-007: file larger than the type-specific threshold
fn c007_oversized_file(content: &Content, _ctx: &ContentCtx) -> Option<ValidationIssue> {
    let size = content.file_size?;
    let limit = match content.content_type.as_deref()? {
        "image" => MAX_IMAGE_BYTES,
        "video" => MAX_VIDEO_BYTES,
        _ => return None,
    };
    if size <= limit {
        return None;
    }

    Some(ValidationIssue::new(
        "C-007",
        Severity::Warning,
        "content",
        &content.id,
        content.display_name(),
        format!(
            "File is {:.1} MB, above the {:.0} MB limit for this type",
            size as f64 / (1024.0 * 1024.0),
            limit as f64 / (1024.0 * 1024.0)
        ),
        "Compress or re-encode the asset to reduce player load times",
    ))
}
