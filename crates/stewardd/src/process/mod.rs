mod errors;
pub(crate) mod files;
pub(crate) mod launch;
mod managed;
pub(crate) mod shutdown;

pub use errors::LaunchError;
pub use launch::{Supervisor, run_supervisor, run_supervisor_with};
pub use managed::{
    CONFIG_FLAG, ManagedProcess, ProcessSpawner, ReleasePolicy, SpawnError, SystemSpawner,
    build_arguments, spawn_managed,
};
pub use shutdown::{
    STOP_SIGNALS, ShutdownError, ShutdownLatch, SignalRegistration, StopCoordinator,
    install_signal_handlers,
};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
