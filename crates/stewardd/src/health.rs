//! Structured health reporting for supervisor lifecycle events.

use std::io;
use std::path::Path;
use std::sync::Arc;

use steward_tree::ResolveReport;

use crate::bootstrap::{BootstrapError, Settings};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before the configuration tree is loaded.
    fn bootstrap_starting(&self);

    /// Invoked once placeholders have been resolved.
    fn tree_resolved(&self, report: &ResolveReport);

    /// Invoked after the server configuration file has been written.
    fn server_config_written(&self, path: &Path, entries: usize);

    /// Invoked when writing the server configuration file fails.
    fn server_config_failed(&self, path: &Path, error: &io::Error);

    /// Invoked after the managed server has been launched.
    fn server_spawned(&self, executable: &Path, pid: u32);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, settings: &Settings);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once, when the supervisor begins its stop sequence.
    fn supervisor_stopping(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn tree_resolved(&self, report: &ResolveReport) {
        (**self).tree_resolved(report);
    }

    fn server_config_written(&self, path: &Path, entries: usize) {
        (**self).server_config_written(path, entries);
    }

    fn server_config_failed(&self, path: &Path, error: &io::Error) {
        (**self).server_config_failed(path, error);
    }

    fn server_spawned(&self, executable: &Path, pid: u32) {
        (**self).server_spawned(executable, pid);
    }

    fn bootstrap_succeeded(&self, settings: &Settings) {
        (**self).bootstrap_succeeded(settings);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn supervisor_stopping(&self) {
        (**self).supervisor_stopping();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "loading configuration tree"
        );
    }

    fn tree_resolved(&self, report: &ResolveReport) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "tree_resolved",
            visited = report.visited,
            rewritten = report.rewritten,
            "placeholders resolved"
        );
    }

    fn server_config_written(&self, path: &Path, entries: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "server_config_written",
            file = %path.display(),
            entries,
            "server configuration saved"
        );
    }

    fn server_config_failed(&self, path: &Path, error: &io::Error) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "server_config_failed",
            file = %path.display(),
            error = %error,
            "server configuration could not be written"
        );
    }

    fn server_spawned(&self, executable: &Path, pid: u32) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "server_spawned",
            executable = %executable.display(),
            pid,
            "managed server launched"
        );
    }

    fn bootstrap_succeeded(&self, settings: &Settings) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            terminal = settings.terminal(),
            system_log = ?settings.system_log(),
            config_file = ?settings.config_file(),
            executable = ?settings.executable(),
            "initialization done"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "supervisor bootstrap failed"
        );
    }

    fn supervisor_stopping(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "supervisor_stopping",
            "stopping supervisor"
        );
    }
}
