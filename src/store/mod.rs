//! Run-state persistence
//!
//! One JSON document at a fixed location, overwritten every run, stands in
//! for what would otherwise be a one-row table. The [`StateStore`] trait
//! keeps the orchestrator and comparison logic independent of the backing
//! storage so a key-value or relational store could be swapped in later.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::MonitorState;

/// Interface the orchestrator persists through
pub trait StateStore {
    /// Previous run's state, or `None` on cold start
    ///
    /// A missing or malformed file is a cold start, never an error; the
    /// change comparison must tolerate it.
    fn load(&self) -> Option<MonitorState>;

    /// Fully overwrite the stored state with this run's outcome
    fn save(&self, state: &MonitorState) -> Result<()>;
}

/// Single-file JSON store
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Option<MonitorState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                tracing::debug!(path = %self.path.display(), "no previous state, cold start");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "previous state is malformed, treating as cold start"
                );
                None
            }
        }
    }

    fn save(&self, state: &MonitorState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Atomic write using temp file
        let temp_path = self.path.with_extension("tmp");
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), "run state persisted");
        Ok(())
    }
}
