//! Supervisor bootstrap orchestration.
//!
//! The sequence is fixed: load the tree, resolve placeholders, read the
//! settings, write the server configuration, launch the server. Loading and
//! launching failures are fatal; a configuration file that cannot be written
//! is reported and startup continues.

use std::path::{Path, PathBuf};

use thiserror::Error;

use steward_tree::source::load_file;
use steward_tree::{ConfigNode, Environment, Scalar, TreeError, render_children, resolve_tree};

use crate::health::HealthReporter;
use crate::process::files::atomic_write;
use crate::process::{ManagedProcess, ProcessSpawner, SpawnError, spawn_managed};

const TERMINAL_KEY: &str = "application.terminal";
const CONFIG_FILE_KEY: &str = "application.path";
const EXECUTABLE_KEY: &str = "application.executable";
const SYSTEM_LOG_KEY: &str = "database.systemLog.path.[v]";
const DATABASE_KEY: &str = "database";

/// Trait abstracting configuration tree loading for testability.
pub trait TreeSource: Send + Sync {
    /// Loads the configuration tree.
    fn load(&self) -> Result<ConfigNode, TreeError>;
}

/// Source that reads a JSON document from disk.
#[derive(Debug, Clone)]
pub struct FileTreeSource {
    path: PathBuf,
}

impl FileTreeSource {
    /// Builds a source for the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TreeSource for FileTreeSource {
    fn load(&self) -> Result<ConfigNode, TreeError> {
        load_file(&self.path)
    }
}

/// Source that hands out a copy of an in-memory tree.
#[derive(Debug, Clone)]
pub struct StaticTreeSource {
    tree: ConfigNode,
}

impl StaticTreeSource {
    /// Wraps an already built tree.
    #[must_use]
    pub fn new(tree: ConfigNode) -> Self {
        Self { tree }
    }
}

impl TreeSource for StaticTreeSource {
    fn load(&self) -> Result<ConfigNode, TreeError> {
        Ok(self.tree.clone())
    }
}

/// Errors surfaced during bootstrap. Both are fatal to startup.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The configuration tree failed to load.
    #[error("failed to load configuration tree: {source}")]
    Tree {
        /// Underlying loader error.
        #[source]
        source: TreeError,
    },
    /// The managed server could not be launched.
    #[error("managed server cannot be spawned: {source}")]
    Spawn {
        /// Underlying spawn error.
        #[source]
        source: SpawnError,
    },
}

/// Scalar settings read from the resolved tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    terminal: bool,
    system_log: Option<PathBuf>,
    config_file: Option<PathBuf>,
    executable: Option<PathBuf>,
}

impl Settings {
    /// Reads the settings from a resolved tree. Missing or empty values are
    /// treated as unset.
    #[must_use]
    pub fn from_tree(tree: &ConfigNode) -> Self {
        Self {
            terminal: tree
                .value_at(TERMINAL_KEY)
                .and_then(Scalar::as_bool)
                .unwrap_or(false),
            system_log: path_at(tree, SYSTEM_LOG_KEY),
            config_file: path_at(tree, CONFIG_FILE_KEY),
            executable: path_at(tree, EXECUTABLE_KEY),
        }
    }

    /// Whether the supervisor runs interactively and echoes server logs.
    #[must_use]
    pub fn terminal(&self) -> bool {
        self.terminal
    }

    /// Log file written by the managed server.
    #[must_use]
    pub fn system_log(&self) -> Option<&Path> {
        self.system_log.as_deref()
    }

    /// Destination of the generated server configuration.
    #[must_use]
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Server binary to launch.
    #[must_use]
    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }
}

fn path_at(tree: &ConfigNode, key: &str) -> Option<PathBuf> {
    let text = tree.value_at(key)?.to_text();
    (!text.is_empty()).then(|| PathBuf::from(text))
}

/// Result of a successful bootstrap. The configuration tree is gone by now.
#[derive(Debug)]
pub struct Startup {
    settings: Settings,
    process: ManagedProcess,
}

impl Startup {
    /// Settings read from the tree.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The launched server, or an unspawned placeholder.
    #[must_use]
    pub fn process(&self) -> &ManagedProcess {
        &self.process
    }

    /// Splits the startup into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Settings, ManagedProcess) {
        (self.settings, self.process)
    }
}

/// Bootstraps the supervisor using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError::Tree`] when the tree cannot be loaded and
/// [`BootstrapError::Spawn`] when the configured executable cannot be
/// launched.
pub fn bootstrap_with(
    source: &dyn TreeSource,
    environment: &Environment,
    spawner: &dyn ProcessSpawner,
    reporter: &dyn HealthReporter,
) -> Result<Startup, BootstrapError> {
    reporter.bootstrap_starting();

    let mut tree = match source.load() {
        Ok(tree) => tree,
        Err(source) => {
            let error = BootstrapError::Tree { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let report = resolve_tree(&mut tree, environment);
    reporter.tree_resolved(&report);

    let settings = Settings::from_tree(&tree);
    if let Some(path) = settings.config_file() {
        write_server_config(&tree, path, reporter);
    }
    drop(tree);

    let process = match settings.executable() {
        Some(executable) => {
            let config_file = settings.config_file().unwrap_or_else(|| Path::new(""));
            match spawn_managed(spawner, executable, config_file) {
                Ok(process) => process,
                Err(source) => {
                    let error = BootstrapError::Spawn { source };
                    reporter.bootstrap_failed(&error);
                    return Err(error);
                }
            }
        }
        None => ManagedProcess::none(),
    };
    if let (Some(executable), Some(pid)) = (settings.executable(), process.pid()) {
        reporter.server_spawned(executable, pid);
    }

    reporter.bootstrap_succeeded(&settings);
    Ok(Startup { settings, process })
}

fn write_server_config(tree: &ConfigNode, path: &Path, reporter: &dyn HealthReporter) {
    let mut contents = Vec::new();
    let rendered = match tree.find(DATABASE_KEY) {
        Some(database) => render_children(database, &mut contents),
        None => Ok(0),
    };
    match rendered.and_then(|entries| atomic_write(path, &contents).map(|()| entries)) {
        Ok(entries) => reporter.server_config_written(path, entries),
        Err(error) => reporter.server_config_failed(path, &error),
    }
}
