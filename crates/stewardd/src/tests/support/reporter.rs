//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use steward_tree::ResolveReport;

use crate::bootstrap::{BootstrapError, Settings};
use crate::health::HealthReporter;

/// Structured health events tracked during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Placeholders were resolved.
    TreeResolved { visited: usize, rewritten: usize },
    /// The server configuration was written.
    ServerConfigWritten { path: PathBuf, entries: usize },
    /// The server configuration could not be written.
    ServerConfigFailed(PathBuf),
    /// The server was launched.
    ServerSpawned(PathBuf),
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// The stop sequence began.
    SupervisorStopping,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn tree_resolved(&self, report: &ResolveReport) {
        self.record(HealthEvent::TreeResolved {
            visited: report.visited,
            rewritten: report.rewritten,
        });
    }

    fn server_config_written(&self, path: &Path, entries: usize) {
        self.record(HealthEvent::ServerConfigWritten {
            path: path.to_path_buf(),
            entries,
        });
    }

    fn server_config_failed(&self, path: &Path, _error: &io::Error) {
        self.record(HealthEvent::ServerConfigFailed(path.to_path_buf()));
    }

    fn server_spawned(&self, executable: &Path, _pid: u32) {
        self.record(HealthEvent::ServerSpawned(executable.to_path_buf()));
    }

    fn bootstrap_succeeded(&self, _settings: &Settings) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn supervisor_stopping(&self) {
        self.record(HealthEvent::SupervisorStopping);
    }
}
