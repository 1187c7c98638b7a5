//! Supervises launch sequencing and the runtime tick loop.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use ortho_config::OrthoConfig;
use tracing::{info, warn};

use steward_config::{Config, DEFAULT_TICK_INTERVAL_MS};
use steward_tree::Environment;

use crate::StructuredHealthReporter;
use crate::bootstrap::{FileTreeSource, TreeSource, bootstrap_with};
use crate::environment;
use crate::health::HealthReporter;
use crate::tail::{LineSink, LogCursor, WriterSink, pump};
use crate::telemetry;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::managed::{ManagedProcess, ProcessSpawner, ReleasePolicy, SystemSpawner};
use super::shutdown::{StopCoordinator, install_signal_handlers};

/// Runs the supervisor using the production collaborators.
///
/// # Errors
///
/// Returns [`LaunchError`] when configuration, telemetry, bootstrap or signal
/// installation fails.
pub fn run_supervisor() -> Result<(), LaunchError> {
    let config = Config::load()?;
    telemetry::initialise(&config)?;
    let environment = environment::detect(&config);
    let source = FileTreeSource::new(config.tree_path().as_std_path());
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    run_supervisor_with(
        &config,
        &source,
        &environment,
        &SystemSpawner::new(),
        reporter,
        Box::new(WriterSink::new(io::stdout())),
    )
}

/// Runs the supervisor with injected collaborators until a stop signal
/// arrives.
///
/// # Errors
///
/// Returns [`LaunchError::Bootstrap`] when bootstrap fails and
/// [`LaunchError::Signals`] when stop handlers cannot be installed.
pub fn run_supervisor_with(
    config: &Config,
    source: &dyn TreeSource,
    environment: &Environment,
    spawner: &dyn ProcessSpawner,
    reporter: Arc<dyn HealthReporter>,
    sink: Box<dyn LineSink + Send>,
) -> Result<(), LaunchError> {
    info!(target: PROCESS_TARGET, "starting supervisor");
    let startup = bootstrap_with(source, environment, spawner, &*reporter)?;
    let (settings, process) = startup.into_parts();

    let mut supervisor = Supervisor::new(process, reporter, sink)
        .with_interval(config.tick_interval())
        .with_release_policy(ReleasePolicy::from_terminate_flag(
            config.terminate_on_stop(),
        ));
    if settings.terminal()
        && let Some(log) = settings.system_log()
    {
        match LogCursor::open(log) {
            Ok(cursor) => supervisor = supervisor.with_tail(cursor),
            Err(error) => warn!(
                target: PROCESS_TARGET,
                file = %log.display(),
                error = %error,
                "server log cannot be followed"
            ),
        }
    }

    let registration = install_signal_handlers(supervisor.coordinator())?;
    supervisor.run();
    drop(registration);
    Ok(())
}

/// Runtime state owned by the tick loop.
///
/// Signal handlers and stop requests only raise flags. The loop notices them
/// on the next tick and performs the teardown itself, so teardown happens
/// once and never in signal context.
pub struct Supervisor {
    coordinator: Arc<StopCoordinator>,
    stop: Arc<AtomicBool>,
    process: ManagedProcess,
    tail: Option<LogCursor>,
    sink: Box<dyn LineSink + Send>,
    interval: Duration,
    policy: ReleasePolicy,
    reporter: Arc<dyn HealthReporter>,
    exit_reported: bool,
}

impl Supervisor {
    /// Builds a supervisor around an already launched process.
    #[must_use]
    pub fn new(
        process: ManagedProcess,
        reporter: Arc<dyn HealthReporter>,
        sink: Box<dyn LineSink + Send>,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        Self {
            coordinator: Arc::new(StopCoordinator::with_flag(Arc::clone(&stop))),
            stop,
            process,
            tail: None,
            sink,
            interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            policy: ReleasePolicy::default(),
            reporter,
            exit_reported: false,
        }
    }

    /// Sets the delay between ticks.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets what happens to a running server at teardown.
    #[must_use]
    pub fn with_release_policy(mut self, policy: ReleasePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Follows `cursor` and echoes its lines to the sink on every tick.
    #[must_use]
    pub fn with_tail(mut self, cursor: LogCursor) -> Self {
        self.tail = Some(cursor);
        self
    }

    /// Coordinator every stop trigger must go through.
    #[must_use]
    pub fn coordinator(&self) -> &Arc<StopCoordinator> {
        &self.coordinator
    }

    /// Performs one unit of work. Returns `false` once a stop was requested.
    ///
    /// A delivered stop signal is turned into a stop request here.
    pub fn tick(&mut self) -> bool {
        if self.coordinator.poll_signals() {
            info!(target: PROCESS_TARGET, "stop signal received");
        }
        if self.stop.load(Ordering::Acquire) {
            return false;
        }
        self.observe_exit();
        self.pump_tail();
        true
    }

    /// Ticks until a stop is requested, then tears down.
    pub fn run(mut self) {
        info!(
            target: PROCESS_TARGET,
            interval_ms = self.interval.as_millis(),
            pid = ?self.process.pid(),
            tailing = self.tail.is_some(),
            "supervisor running"
        );
        while self.tick() {
            thread::sleep(self.interval);
        }
        self.teardown();
    }

    fn observe_exit(&mut self) {
        if self.exit_reported {
            return;
        }
        if let Some(status) = self.process.try_exit_status() {
            self.exit_reported = true;
            warn!(
                target: PROCESS_TARGET,
                pid = ?self.process.pid(),
                %status,
                "managed server exited"
            );
        }
    }

    fn pump_tail(&mut self) {
        let Some(cursor) = self.tail.as_mut() else {
            return;
        };
        if let Err(error) = pump(cursor, self.sink.as_mut()) {
            warn!(
                target: PROCESS_TARGET,
                file = %cursor.path().display(),
                error = %error,
                "failed to follow server log"
            );
        }
    }

    fn teardown(mut self) {
        self.reporter.supervisor_stopping();
        self.process.release(self.policy);
        self.tail = None;
        info!(target: PROCESS_TARGET, "shutdown sequence completed");
    }
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("coordinator", &self.coordinator)
            .field("process", &self.process)
            .field("tail", &self.tail)
            .field("interval", &self.interval)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
