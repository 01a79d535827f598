//! Change-gated webhook alerting
//!
//! An alert goes out only when the readiness verdict differs from the
//! previous run's. Delivery failures are logged and swallowed: a lost
//! notification must never abort the run or flip its exit code.

use reqwest::Client;
use std::time::Duration;

use crate::error::Result;
use crate::models::{MonitorState, Readiness, Severity};

/// Source label in the alert footer
const SOURCE_LABEL: &str = "fleetwatch monitor";

/// Maximum critical issues listed before eliding
const MAX_CRITICAL_LINES: usize = 5;

/// Maximum warnings listed when there are no criticals
const MAX_WARNING_LINES: usize = 3;

/// Webhook alert dispatcher
///
/// Constructed once per run; with no webhook configured every dispatch is
/// a logged no-op.
pub struct AlertDispatcher {
    client: Client,
    webhook_url: Option<String>,
}

impl AlertDispatcher {
    /// Create a dispatcher
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` if the HTTP client cannot be created.
    pub fn new(webhook_url: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// Compare verdicts and send an alert on a transition
    ///
    /// Side-effecting only; never returns an error.
    pub async fn dispatch(&self, current: &MonitorState, previous: Option<&MonitorState>) {
        let previous_readiness = previous.map(|p| p.readiness);
        if previous_readiness == Some(current.readiness) {
            tracing::debug!(readiness = %current.readiness, "readiness unchanged, no alert");
            return;
        }

        let Some(url) = &self.webhook_url else {
            tracing::info!(
                readiness = %current.readiness,
                "readiness changed but no webhook configured, skipping alert"
            );
            return;
        };

        let payload = build_payload(current, previous_readiness);
        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(readiness = %current.readiness, "alert delivered");
            }
            Ok(response) => {
                tracing::warn!(
                    status = %response.status(),
                    "alert delivery failed, continuing run"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "alert delivery failed, continuing run");
            }
        }
    }
}

/// Build the block-based webhook payload
///
/// Header with status icon, transition summary with aggregate counts, one
/// issue block (top criticals, else top warnings), context footer.
fn build_payload(current: &MonitorState, previous: Option<Readiness>) -> serde_json::Value {
    let transition = format!(
        "{} → {}",
        previous.map(|p| p.as_str()).unwrap_or("none"),
        current.readiness.as_str()
    );

    let mut blocks = vec![
        serde_json::json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("{} Fleet readiness: {}", current.readiness.icon(), current.readiness.as_str()),
                "emoji": true
            }
        }),
        serde_json::json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*Transition:* {}\n*Issues:* {} total ({} critical, {} warning, {} info)",
                    transition,
                    current.total_issues,
                    current.critical_count,
                    current.warning_count,
                    current.info_count
                )
            }
        }),
    ];

    if let Some(block) = issue_block(current) {
        blocks.push(block);
    }

    blocks.push(serde_json::json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": format!("{SOURCE_LABEL} | {}", current.timestamp.to_rfc3339())
        }]
    }));

    serde_json::json!({ "blocks": blocks })
}

/// Up to five criticals with elision, or up to three warnings
fn issue_block(state: &MonitorState) -> Option<serde_json::Value> {
    let criticals: Vec<_> = state
        .issues
        .iter()
        .filter(|i| i.severity == Severity::Critical)
        .collect();

    let (title, selected, limit) = if !criticals.is_empty() {
        ("*Critical issues:*", criticals, MAX_CRITICAL_LINES)
    } else {
        let warnings: Vec<_> = state
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .collect();
        if warnings.is_empty() {
            return None;
        }
        ("*Warnings:*", warnings, MAX_WARNING_LINES)
    };

    let mut lines: Vec<String> = selected
        .iter()
        .take(limit)
        .map(|i| format!("• [{}] {} — {}", i.rule, i.entity_name, i.message))
        .collect();
    if selected.len() > limit {
        lines.push(format!("...and {} more", selected.len() - limit));
    }

    Some(serde_json::json!({
        "type": "section",
        "text": {
            "type": "mrkdwn",
            "text": format!("{title}\n{}", lines.join("\n"))
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationIssue;

    fn issue(rule: &str, severity: Severity, name: &str) -> ValidationIssue {
        ValidationIssue::new(rule, severity, "display", "d1", name, "broken", "fix it")
    }

    fn state_with(issues: Vec<ValidationIssue>, readiness: Readiness) -> MonitorState {
        MonitorState::from_issues(readiness, vec!["display".to_string()], issues, 5)
    }

    #[test]
    fn test_payload_has_header_transition_and_footer() {
        let state = state_with(
            vec![issue("D-001", Severity::Critical, "Lobby")],
            Readiness::NotReady,
        );
        let payload = build_payload(&state, Some(Readiness::Ready));
        let blocks = payload["blocks"].as_array().unwrap();

        assert_eq!(blocks.len(), 4);
        assert!(blocks[0]["text"]["text"]
            .as_str()
            .unwrap()
            .contains("NOT_READY"));
        assert!(blocks[1]["text"]["text"]
            .as_str()
            .unwrap()
            .contains("READY → NOT_READY"));
        assert!(blocks[3]["elements"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("fleetwatch monitor | "));
    }

    #[test]
    fn test_cold_start_transition_from_none() {
        let state = state_with(Vec::new(), Readiness::Ready);
        let payload = build_payload(&state, None);
        assert!(payload["blocks"][1]["text"]["text"]
            .as_str()
            .unwrap()
            .contains("none → READY"));
    }

    #[test]
    fn test_critical_list_elision() {
        let issues: Vec<_> = (0..8)
            .map(|n| issue("D-001", Severity::Critical, &format!("Screen {n}")))
            .collect();
        let state = state_with(issues, Readiness::NotReady);
        let payload = build_payload(&state, Some(Readiness::Ready));

        let text = payload["blocks"][2]["text"]["text"].as_str().unwrap();
        assert_eq!(text.matches("• [D-001]").count(), 5);
        assert!(text.contains("...and 3 more"));
    }

    #[test]
    fn test_warnings_listed_when_no_criticals() {
        let issues = vec![
            issue("C-002", Severity::Warning, "Promo"),
            issue("C-005", Severity::Warning, "Menu"),
        ];
        let state = state_with(issues, Readiness::Degraded);
        let payload = build_payload(&state, Some(Readiness::Ready));

        let text = payload["blocks"][2]["text"]["text"].as_str().unwrap();
        assert!(text.contains("*Warnings:*"));
        assert_eq!(text.matches('•').count(), 2);
    }

    #[test]
    fn test_no_issue_block_when_clean() {
        let state = state_with(Vec::new(), Readiness::Ready);
        let payload = build_payload(&state, Some(Readiness::Degraded));
        // header, summary, footer only
        assert_eq!(payload["blocks"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_dispatch_without_webhook_is_noop() {
        let dispatcher = AlertDispatcher::new(None, Duration::from_secs(1)).unwrap();
        let state = state_with(Vec::new(), Readiness::Degraded);
        // Must not panic or attempt any network call
        dispatcher.dispatch(&state, None).await;
    }
}
