//! Supervisor for a managed database server.
//!
//! On startup the supervisor loads a JSON configuration tree, substitutes
//! host-specific placeholders, writes the server's configuration file from
//! the `database` subtree and launches the server with it. It then ticks at
//! a fixed rate, echoing the server's log file when running interactively,
//! until a stop signal arrives. Runtime settings for the supervisor itself
//! come from [`steward_config::Config`].
//!
//! Each stage reports through a [`HealthReporter`] so operators can follow
//! the lifecycle in structured logs. Every stop trigger funnels into a single
//! [`StopCoordinator`], which guarantees that teardown runs exactly once no
//! matter how many signals arrive.

mod bootstrap;
pub mod environment;
mod health;
mod process;
pub mod tail;
pub mod telemetry;

pub use bootstrap::{
    BootstrapError, FileTreeSource, Settings, StaticTreeSource, Startup, TreeSource,
    bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    CONFIG_FLAG, LaunchError, ManagedProcess, ProcessSpawner, ReleasePolicy, STOP_SIGNALS,
    ShutdownError, ShutdownLatch, SignalRegistration, SpawnError, StopCoordinator, Supervisor,
    SystemSpawner, build_arguments, install_signal_handlers, run_supervisor, run_supervisor_with,
    spawn_managed,
};
pub use tail::{LineSink, LogCursor, WriterSink};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
