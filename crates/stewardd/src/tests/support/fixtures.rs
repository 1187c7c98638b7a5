//! Configuration tree fixtures and capture sinks.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use steward_tree::{ConfigNode, Environment};

use crate::tail::LineSink;

/// Placeholder environment used throughout the suites.
#[must_use]
pub fn environment() -> Environment {
    Environment::new("10.0.0.7", "/srv/db")
}

/// Builds configuration trees rooted in a scratch directory.
pub struct TreeFixture {
    dir: TempDir,
}

impl TreeFixture {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create fixture directory"),
        }
    }

    /// Scratch directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where bootstrap is told to write the server configuration.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.dir.path().join("mongod.conf")
    }

    /// A complete tree with an `application` block and a `database` subtree.
    #[must_use]
    pub fn tree(&self, executable: &str) -> ConfigNode {
        self.application(executable).with_child(
            ConfigNode::new("database")
                .with_child(
                    ConfigNode::new("systemLog")
                        .with_child(ConfigNode::leaf("destination", "file"))
                        .with_child(ConfigNode::leaf("path", "[object]/mongod.log")),
                )
                .with_child(
                    ConfigNode::new("net")
                        .with_child(ConfigNode::leaf("bindIp", "[subnet]"))
                        .with_child(ConfigNode::leaf("port", 27017_i64)),
                ),
        )
    }

    /// Server log inside the scratch directory.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.dir.path().join("mongod.log")
    }

    /// A tree without an executable whose server log is [`Self::log_file`].
    #[must_use]
    pub fn tailed(&self, terminal: bool) -> ConfigNode {
        let log_file = self.log_file();
        self.with_terminal("", terminal).with_child(
            ConfigNode::new("database").with_child(
                ConfigNode::new("systemLog")
                    .with_child(ConfigNode::leaf("destination", "file"))
                    .with_child(ConfigNode::leaf(
                        "path",
                        log_file.to_string_lossy().into_owned(),
                    )),
            ),
        )
    }

    /// A tree with only the `application` block.
    #[must_use]
    pub fn application(&self, executable: &str) -> ConfigNode {
        self.with_terminal(executable, false)
    }

    fn with_terminal(&self, executable: &str, terminal: bool) -> ConfigNode {
        let config_file = self.config_file();
        ConfigNode::new("").with_child(
            ConfigNode::new("application")
                .with_child(ConfigNode::leaf("terminal", terminal))
                .with_child(ConfigNode::leaf(
                    "path",
                    config_file.to_string_lossy().into_owned(),
                ))
                .with_child(ConfigNode::leaf("executable", executable)),
        )
    }
}

/// Sink that keeps every line in memory; clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CaptureSink {
    /// Lines received so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("capture sink mutex poisoned").clone()
    }
}

impl LineSink for CaptureSink {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .expect("capture sink mutex poisoned")
            .push(line.to_owned());
        Ok(())
    }
}
