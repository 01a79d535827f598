//! Liveness/readiness probing for the signage API
//!
//! Runs before any authenticated work so that a transient infrastructure
//! outage is reported as UNHEALTHY instead of masquerading as a pile of
//! domain-rule violations.

use std::collections::HashMap;

use crate::config::{LIVENESS_TIMEOUT, READINESS_TIMEOUT};

use super::ApiClient;

/// Outcome of the pre-run health probe
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// True only when both probes returned success
    pub healthy: bool,

    /// Sub-service name to status string, as reported by the API or
    /// synthesized from probe failures
    pub services: HashMap<String, String>,
}

impl ApiClient {
    /// Probe the liveness and readiness endpoints
    ///
    /// Each probe runs under its own timeout. Failures of any kind
    /// (non-success status, network error, timeout) are recorded as an
    /// unhealthy sub-service string, never re-thrown. The readiness probe
    /// is skipped when the liveness probe already failed.
    pub async fn probe_health(&self) -> HealthStatus {
        let mut services = HashMap::new();

        let live_url = format!("{}/health", self.base_url);
        match self
            .client
            .get(&live_url)
            .timeout(LIVENESS_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                services.insert("api".to_string(), "up".to_string());
            }
            Ok(response) => {
                services.insert(
                    "api".to_string(),
                    format!("unhealthy: status {}", response.status()),
                );
                tracing::warn!(status = %response.status(), "liveness probe failed");
                return HealthStatus {
                    healthy: false,
                    services,
                };
            }
            Err(e) => {
                services.insert("api".to_string(), format!("unreachable: {e}"));
                tracing::warn!(error = %e, "liveness probe failed");
                return HealthStatus {
                    healthy: false,
                    services,
                };
            }
        }

        let ready_url = format!("{}/ready", self.base_url);
        match self
            .client
            .get(&ready_url)
            .timeout(READINESS_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status();
                let healthy = status.is_success();

                // Merge the sub-service map when the body provides one
                if let Ok(body) = response.json::<serde_json::Value>().await {
                    if let Some(map) = body.get("services").and_then(|v| v.as_object()) {
                        for (name, value) in map {
                            let text = value
                                .as_str()
                                .map(str::to_string)
                                .unwrap_or_else(|| value.to_string());
                            services.insert(name.clone(), text);
                        }
                    }
                }

                if !healthy {
                    services.insert("ready".to_string(), format!("unhealthy: status {status}"));
                    tracing::warn!(%status, "readiness probe failed");
                }

                HealthStatus { healthy, services }
            }
            Err(e) => {
                services.insert("ready".to_string(), format!("unreachable: {e}"));
                tracing::warn!(error = %e, "readiness probe failed");
                HealthStatus {
                    healthy: false,
                    services,
                }
            }
        }
    }
}
