//! Configuration management for the fleetwatch validator
//!
//! All configuration comes from environment variables; the two service
//! account credentials are the only required values. Missing credentials
//! abort the run before any network work (exit code 2).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Hard cap on items accumulated per paginated fetch
pub const FETCH_CAP: usize = 500;

/// Items requested per page
pub const PAGE_SIZE: usize = 100;

/// Per-request timeout for the liveness probe
pub const LIVENESS_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-request timeout for the readiness probe
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(15);

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base address of the signage read API
    pub api_url: String,

    /// Service account email
    pub email: String,

    /// Service account password
    pub password: String,

    /// Webhook address for readiness-transition alerts; None disables alerting
    pub webhook_url: Option<String>,

    /// Location of the persisted run-state file
    pub state_path: PathBuf,

    /// Per-call request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when a required credential is absent.
    pub fn from_env() -> Result<Self> {
        let email = std::env::var("FLEETWATCH_EMAIL")
            .map_err(|_| Error::config("FLEETWATCH_EMAIL is not set"))?;

        let password = std::env::var("FLEETWATCH_PASSWORD")
            .map_err(|_| Error::config("FLEETWATCH_PASSWORD is not set"))?;

        let api_url = api_url_from_env();

        let webhook_url = std::env::var("FLEETWATCH_WEBHOOK_URL")
            .ok()
            .filter(|v| !v.is_empty());

        let state_path = std::env::var("FLEETWATCH_STATE_PATH")
            .unwrap_or_else(|_| String::from("data/monitor-state.json"))
            .into();

        let request_timeout_secs =
            parse_timeout_secs(std::env::var("FLEETWATCH_REQUEST_TIMEOUT").ok())?;

        let config = Self {
            api_url,
            email,
            password,
            webhook_url,
            state_path,
            request_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load only what the unauthenticated health probe needs
    ///
    /// `fleetwatch health` hits public endpoints, so credentials may be
    /// absent from the environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for a malformed API URL or timeout.
    pub fn probe_from_env() -> Result<(String, Duration)> {
        let api_url = api_url_from_env();
        check_api_url(&api_url)?;
        let timeout_secs = parse_timeout_secs(std::env::var("FLEETWATCH_REQUEST_TIMEOUT").ok())?;
        Ok((api_url, Duration::from_secs(timeout_secs)))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.email.is_empty() {
            return Err(Error::config("service account email must not be empty"));
        }

        check_api_url(&self.api_url)?;

        if self.request_timeout_secs == 0 {
            return Err(Error::config("request timeout must be greater than 0"));
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn api_url_from_env() -> String {
    std::env::var("FLEETWATCH_API_URL").unwrap_or_else(|_| String::from("http://localhost:3000"))
}

fn check_api_url(api_url: &str) -> Result<()> {
    if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
        return Err(Error::config(format!(
            "api_url must start with http:// or https://, got {api_url}"
        )));
    }
    Ok(())
}

/// An unset or empty variable means the 30 second default; anything else
/// must parse as a whole number of seconds.
fn parse_timeout_secs(raw: Option<String>) -> Result<u64> {
    match raw.filter(|v| !v.is_empty()) {
        None => Ok(30),
        Some(v) => v.parse().map_err(|_| {
            Error::config(format!(
                "FLEETWATCH_REQUEST_TIMEOUT must be a whole number of seconds, got {v:?}"
            ))
        }),
    }
}
