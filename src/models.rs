// Core data structures for the fleetwatch validator

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Severity of a single validation issue
///
/// Ordered so that `Critical > Warning > Info`, which the readiness
/// aggregation relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate verdict of a validation run
///
/// Derived from the issue list by [`crate::rules::aggregate_readiness`],
/// except `Unhealthy` which is set only by the orchestrator when the
/// health probe fails (rule evaluation is skipped entirely in that case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Readiness {
    #[serde(rename = "READY")]
    Ready,
    #[serde(rename = "DEGRADED")]
    Degraded,
    #[serde(rename = "NOT_READY")]
    NotReady,
    #[serde(rename = "UNHEALTHY")]
    Unhealthy,
}

impl Readiness {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Degraded => "DEGRADED",
            Self::NotReady => "NOT_READY",
            Self::Unhealthy => "UNHEALTHY",
        }
    }

    /// Status icon used in alert headers
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Ready => "✅",
            Self::Degraded => "⚠️",
            Self::NotReady => "🚨",
            Self::Unhealthy => "🛑",
        }
    }

    /// Process exit code contract: 0 only when fully ready
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Ready => 0,
            _ => 1,
        }
    }
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One rule violation instance
///
/// Produced fresh every run; never persisted individually, only as part
/// of a [`MonitorState`] snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Rule code, e.g. "D-001"
    pub rule: String,
    pub severity: Severity,
    /// Entity kind: "content", "playlist", "display", "schedule"
    pub entity_kind: String,
    pub entity_id: String,
    pub entity_name: String,
    pub message: String,
    pub recommendation: String,
}

impl ValidationIssue {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rule: &str,
        severity: Severity,
        entity_kind: &str,
        entity_id: &str,
        entity_name: &str,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.to_string(),
            severity,
            entity_kind: entity_kind.to_string(),
            entity_id: entity_id.to_string(),
            entity_name: entity_name.to_string(),
            message: message.into(),
            recommendation: recommendation.into(),
        }
    }
}

/// Outcome of one rule category, held in memory for the duration of a run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub category: String,
    pub checked_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub issues: Vec<ValidationIssue>,
    /// Free-form numeric stats (entity counts, issue counts)
    pub stats: HashMap<String, f64>,
}

impl ValidationResult {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            checked_at: Utc::now(),
            duration_ms: 0,
            issues: Vec::new(),
            stats: HashMap::new(),
        }
    }
}

/// Durable summary of one validation run
///
/// Overwritten by every run and read back at the start of the next one for
/// change comparison. The only structure with a lifecycle beyond a single
/// run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorState {
    pub readiness: Readiness,
    pub timestamp: DateTime<Utc>,
    pub total_issues: usize,
    pub critical_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub categories: Vec<String>,
    pub duration_ms: u64,
    pub issues: Vec<ValidationIssue>,
}

impl MonitorState {
    /// Build a state from a full issue list, deriving the counts
    ///
    /// Keeps the invariant `total_issues == critical + warning + info ==
    /// issues.len()` true by construction.
    pub fn from_issues(
        readiness: Readiness,
        categories: Vec<String>,
        issues: Vec<ValidationIssue>,
        duration_ms: u64,
    ) -> Self {
        let critical_count = issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count();
        let warning_count = issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count();
        let info_count = issues
            .iter()
            .filter(|i| i.severity == Severity::Info)
            .count();

        Self {
            readiness,
            timestamp: Utc::now(),
            total_issues: issues.len(),
            critical_count,
            warning_count,
            info_count,
            categories,
            duration_ms,
            issues,
        }
    }

    /// State recorded when the health probe fails before any rule runs
    pub fn unhealthy(duration_ms: u64) -> Self {
        Self::from_issues(Readiness::Unhealthy, Vec::new(), Vec::new(), duration_ms)
    }
}

// ============================================================================
// Domain snapshot entities
// ============================================================================
//
// Read-only projections fetched fresh every run. All non-id fields are
// optional: the evaluators are written with defensive reads, so a missing
// field means "rule does not fire", never a deserialization failure.

/// Content item as exposed by the signage API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Content {
    pub id: String,
    pub name: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub mime_type: Option<String>,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub status: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub duration: Option<f64>,
    pub file_size: Option<u64>,
}

impl Content {
    /// Best available display name
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or(&self.id)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status.as_deref(), Some("active") | None)
    }

    pub fn is_archived(&self) -> bool {
        self.status.as_deref() == Some("archived")
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e < now)
    }
}

/// One entry in a playlist, referencing a content item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistItem {
    pub content_id: Option<String>,
    pub order: Option<u32>,
}

/// Playlist as exposed by the signage API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Playlist {
    pub id: String,
    pub name: Option<String>,
    pub items: Vec<PlaylistItem>,
    /// Denormalized count some API versions return instead of items
    pub item_count: Option<u32>,
}

impl Playlist {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// True when the playlist has nothing to play
    pub fn is_empty(&self) -> bool {
        if !self.items.is_empty() {
            return false;
        }
        self.item_count.unwrap_or(0) == 0
    }
}

/// Display (physical screen) as exposed by the signage API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Display {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<String>,
    pub current_playlist_id: Option<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
    pub has_error: Option<bool>,
    pub error_message: Option<String>,
}

impl Display {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn is_online(&self) -> bool {
        self.status.as_deref() == Some("online")
    }
}

/// Schedule as exposed by the signage API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    pub id: String,
    pub name: Option<String>,
    pub display_id: Option<String>,
    pub display_group_id: Option<String>,
    pub playlist_id: Option<String>,
    pub is_active: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Zero-padded "HH:MM"
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Day tokens as the API sends them (strings or numbers)
    pub days_of_week: Option<Vec<serde_json::Value>>,
    pub priority: Option<i64>,
}

impl Schedule {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn active(&self) -> bool {
        self.is_active.unwrap_or(false)
    }

    /// Day-of-week tokens normalized to lowercase strings
    ///
    /// The API is loose about day encoding (names, abbreviations, numbers),
    /// so comparison happens on normalized string tokens rather than raw
    /// JSON types. `None` means the schedule applies every day.
    pub fn normalized_days(&self) -> Option<HashSet<String>> {
        self.days_of_week.as_ref().map(|days| {
            days.iter()
                .filter_map(|d| match d {
                    serde_json::Value::String(s) => Some(s.trim().to_lowercase()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
    }
}

/// Complete set of domain entities fetched at the start of one run
///
/// All rules in a run evaluate against the same snapshot; nothing is
/// cached across runs.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub contents: Vec<Content>,
    pub playlists: Vec<Playlist>,
    pub displays: Vec<Display>,
    pub schedules: Vec<Schedule>,
}
