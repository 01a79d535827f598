//! fleetwatch - Fleet-readiness validator for digital signage
//!
//! A periodic batch job that inspects the state of a signage deployment
//! (content, playlists, displays, schedules) through a read-only API,
//! evaluates a fixed catalogue of correctness rules, derives one aggregate
//! readiness verdict, and sends a webhook alert only when that verdict
//! changed since the previous run.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Environment-based configuration
//! - [`client`] - Read-only HTTP client: auth, paginated fetch, health probes
//! - [`models`] - Core data structures and domain snapshot entities
//! - [`rules`] - The rule catalogue, overlap detection, readiness aggregation
//! - [`store`] - Persisted run-state for change comparison
//! - [`notifications`] - Change-gated webhook alerting
//! - [`monitor`] - Run orchestration
//!
//! # Example
//!
//! ```no_run
//! use fleetwatch::config::Config;
//! use fleetwatch::monitor::Monitor;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let monitor = Monitor::new(config)?;
//!     let readiness = monitor.run().await?;
//!     std::process::exit(readiness.exit_code());
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod notifications;
pub mod rules;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::ApiClient;
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{MonitorState, Readiness, Severity, Snapshot, ValidationIssue};
    pub use crate::monitor::Monitor;
}

// Direct re-exports for convenience
pub use models::{MonitorState, Readiness, Severity, Snapshot, ValidationIssue};
