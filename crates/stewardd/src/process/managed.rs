//! Launching and owning the managed server process.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use thiserror::Error;
use tracing::{info, warn};

use super::PROCESS_TARGET;

/// Flag passed to the server ahead of its configuration path.
pub const CONFIG_FLAG: &str = "--config";

/// Abstraction over the OS process launch primitive.
pub trait ProcessSpawner: Send + Sync {
    /// Launches `executable` with `arguments`.
    fn spawn(&self, executable: &Path, arguments: &[OsString]) -> io::Result<Child>;
}

/// Spawner that delegates to [`std::process::Command`].
///
/// The server inherits stdout and stderr so its early diagnostics reach the
/// operator; stdin is closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl SystemSpawner {
    /// Builds a new system spawner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSpawner for SystemSpawner {
    fn spawn(&self, executable: &Path, arguments: &[OsString]) -> io::Result<Child> {
        Command::new(executable)
            .args(arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
    }
}

/// Errors raised while launching the managed server.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The OS refused to launch the executable.
    #[error("failed to launch '{executable}': {source}")]
    Launch {
        /// Executable that failed to launch.
        executable: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// What happens to a still-running server when its handle is released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReleasePolicy {
    /// Free the handle and leave the server running.
    #[default]
    Detach,
    /// Send `SIGTERM` before freeing the handle.
    Terminate,
}

impl ReleasePolicy {
    /// Chooses the policy from the `terminate_on_stop` setting.
    #[must_use]
    pub fn from_terminate_flag(terminate: bool) -> Self {
        if terminate {
            Self::Terminate
        } else {
            Self::Detach
        }
    }
}

/// Builds the server argument vector: the flag, then the configuration path
/// wrapped in literal double quotes as a single argument.
#[must_use]
pub fn build_arguments(config_path: &Path) -> Vec<OsString> {
    let mut quoted = OsString::from("\"");
    quoted.push(config_path.as_os_str());
    quoted.push("\"");
    vec![OsString::from(CONFIG_FLAG), quoted]
}

/// Launches the server when `executable` is non-empty.
///
/// An empty executable path never reaches the spawner and yields
/// [`ManagedProcess::none`]. Failures are not retried.
///
/// # Errors
///
/// Returns [`SpawnError::Launch`] when the spawner fails.
pub fn spawn_managed(
    spawner: &dyn ProcessSpawner,
    executable: &Path,
    config_path: &Path,
) -> Result<ManagedProcess, SpawnError> {
    if executable.as_os_str().is_empty() {
        return Ok(ManagedProcess::none());
    }
    let arguments = build_arguments(config_path);
    info!(
        target: PROCESS_TARGET,
        executable = %executable.display(),
        ?arguments,
        "spawning managed server"
    );
    let child = spawner
        .spawn(executable, &arguments)
        .map_err(|source| SpawnError::Launch {
            executable: executable.to_path_buf(),
            source,
        })?;
    Ok(ManagedProcess {
        child: Some(child),
        executable: Some(executable.to_path_buf()),
        arguments,
    })
}

/// Scoped owner of the managed server handle.
///
/// The handle is released exactly once, either through [`release`] or when
/// the value is dropped. Releasing an unspawned or already released process
/// does nothing.
///
/// [`release`]: ManagedProcess::release
#[derive(Debug, Default)]
pub struct ManagedProcess {
    child: Option<Child>,
    executable: Option<PathBuf>,
    arguments: Vec<OsString>,
}

impl ManagedProcess {
    /// A process slot with nothing spawned.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether a handle is currently held.
    #[must_use]
    pub fn is_spawned(&self) -> bool {
        self.child.is_some()
    }

    /// OS process id while the handle is held.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Executable the server was launched from.
    #[must_use]
    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    /// Arguments the server was launched with.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.arguments
    }

    /// Reports the exit status if the server has already exited.
    ///
    /// The handle is kept so the status can be logged again at release.
    pub fn try_exit_status(&mut self) -> Option<ExitStatus> {
        self.child.as_mut()?.try_wait().ok().flatten()
    }

    /// Releases the handle. Returns `true` when a handle was held.
    pub fn release(&mut self, policy: ReleasePolicy) -> bool {
        let Some(mut child) = self.child.take() else {
            return false;
        };
        let pid = child.id();
        match child.try_wait() {
            Ok(Some(status)) => {
                info!(target: PROCESS_TARGET, pid, %status, "managed server already exited");
            }
            Ok(None) => match policy {
                ReleasePolicy::Detach => {
                    info!(target: PROCESS_TARGET, pid, "leaving managed server running");
                }
                ReleasePolicy::Terminate => terminate(&mut child),
            },
            Err(error) => {
                warn!(
                    target: PROCESS_TARGET,
                    pid,
                    error = %error,
                    "failed to query managed server state"
                );
            }
        }
        true
    }
}

impl Drop for ManagedProcess {
    fn drop(&mut self) {
        self.release(ReleasePolicy::Detach);
    }
}

fn terminate(child: &mut Child) {
    let pid = child.id();
    let Ok(raw) = i32::try_from(pid) else {
        warn!(target: PROCESS_TARGET, pid, "managed server pid out of range");
        return;
    };
    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => {
            info!(target: PROCESS_TARGET, pid, "sent SIGTERM to managed server");
            // Reap immediately when the server exits fast; otherwise init
            // adopts it once the supervisor exits.
            if let Ok(Some(status)) = child.try_wait() {
                info!(target: PROCESS_TARGET, pid, %status, "managed server exited");
            }
        }
        Err(errno) => {
            warn!(
                target: PROCESS_TARGET,
                pid,
                error = %errno,
                "failed to signal managed server"
            );
        }
    }
}
