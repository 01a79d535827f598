//! Run orchestration
//!
//! Sequences one validation run end to end: health probe, login,
//! concurrent snapshot fetch, rule evaluation, aggregation, change
//! comparison, persistence. A failed health probe short-circuits to an
//! UNHEALTHY verdict that is still compared, alerted on, and persisted;
//! "infrastructure down" is itself a readiness transition worth recording.

use std::time::Instant;

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::models::{MonitorState, Readiness};
use crate::notifications::AlertDispatcher;
use crate::rules;
use crate::store::{FileStateStore, StateStore};

/// The validation pipeline, wired up from configuration
pub struct Monitor {
    config: Config,
    client: ApiClient,
    store: Box<dyn StateStore + Send + Sync>,
    dispatcher: AlertDispatcher,
}

impl Monitor {
    /// Build a monitor from configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` if an HTTP client cannot be created.
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(&config)?;
        let store = Box::new(FileStateStore::new(config.state_path.clone()));
        let dispatcher =
            AlertDispatcher::new(config.webhook_url.clone(), config.request_timeout())?;

        Ok(Self {
            config,
            client,
            store,
            dispatcher,
        })
    }

    /// Execute one validation run and return the readiness verdict
    ///
    /// # Errors
    ///
    /// Returns an error only for pre-verdict failures (authentication,
    /// snapshot acquisition); these map to exit code 2 and produce no
    /// state write and no alert. Domain issues are not errors, they are
    /// the verdict.
    pub async fn run(&self) -> Result<Readiness> {
        let started = Instant::now();

        let health = self.client.probe_health().await;
        if !health.healthy {
            tracing::warn!(services = ?health.services, "API unhealthy, skipping rule evaluation");
            let state = MonitorState::unhealthy(started.elapsed().as_millis() as u64);
            self.finish(state).await?;
            return Ok(Readiness::Unhealthy);
        }

        let token = self
            .client
            .login(&self.config.email, &self.config.password)
            .await?;
        let snapshot = self.client.fetch_snapshot(&token).await?;

        let results = rules::evaluate_all(&snapshot);
        for result in &results {
            tracing::info!(
                category = %result.category,
                issues = result.issues.len(),
                duration_ms = result.duration_ms,
                "category evaluated"
            );
        }

        let categories: Vec<String> = results.iter().map(|r| r.category.clone()).collect();
        let issues: Vec<_> = results.into_iter().flat_map(|r| r.issues).collect();
        let readiness = rules::aggregate_readiness(&issues);

        let state = MonitorState::from_issues(
            readiness,
            categories,
            issues,
            started.elapsed().as_millis() as u64,
        );
        self.finish(state).await?;

        tracing::info!(%readiness, duration_ms = started.elapsed().as_millis() as u64, "run complete");
        Ok(readiness)
    }

    /// Compare against the previous run, alert on a transition, persist
    async fn finish(&self, state: MonitorState) -> Result<()> {
        let previous = self.store.load();
        match &previous {
            Some(prev) if prev.readiness != state.readiness => {
                tracing::info!(
                    previous = %prev.readiness,
                    current = %state.readiness,
                    "readiness transition"
                );
            }
            None => {
                tracing::info!(current = %state.readiness, "first recorded run");
            }
            _ => {}
        }

        self.dispatcher.dispatch(&state, previous.as_ref()).await;
        self.store.save(&state)?;
        Ok(())
    }
}
