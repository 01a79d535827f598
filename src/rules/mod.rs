//! Rule catalogue and readiness aggregation
//!
//! Three independent, pure evaluators map one snapshot to lists of typed
//! issues:
//!
//! - [`content`] - content library checks (C-xxx)
//! - [`display`] - display and playlist checks (D-xxx, P-xxx)
//! - [`schedule`] - schedule checks including temporal overlap (S-xxx)
//!
//! Each rule is a named, independently testable function registered into
//! its category's evaluator; no rule depends on another rule's output.
//! Rule order within an evaluator is fixed so issue lists are stable
//! across runs with identical snapshots.

pub mod content;
pub mod display;
pub mod overlap;
pub mod schedule;

pub use overlap::schedules_overlap;

use crate::models::{Readiness, Severity, Snapshot, ValidationIssue, ValidationResult};

/// Run every evaluator against one snapshot
pub fn evaluate_all(snapshot: &Snapshot) -> Vec<ValidationResult> {
    vec![
        content::evaluate(&snapshot.contents, &snapshot.playlists),
        display::evaluate(
            &snapshot.displays,
            &snapshot.playlists,
            &snapshot.schedules,
            &snapshot.contents,
        ),
        schedule::evaluate(&snapshot.schedules, &snapshot.displays, &snapshot.playlists),
    ]
}

/// Reduce an issue list to one readiness verdict by severity precedence
///
/// Any critical issue wins over any number of warnings; warnings win over
/// info. `Unhealthy` is never produced here: it is set only by the
/// orchestrator when the health probe fails, in which case no rule runs.
pub fn aggregate_readiness(issues: &[ValidationIssue]) -> Readiness {
    if issues.iter().any(|i| i.severity == Severity::Critical) {
        Readiness::NotReady
    } else if issues.iter().any(|i| i.severity == Severity::Warning) {
        Readiness::Degraded
    } else {
        Readiness::Ready
    }
}
