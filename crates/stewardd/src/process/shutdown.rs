use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::SigId;
use signal_hook::consts::signal::{SIGABRT, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::{flag, low_level};
use thiserror::Error;
use tracing::debug;

use super::PROCESS_TARGET;

/// Signals that request an orderly stop.
///
/// `SIGILL`, `SIGFPE` and `SIGSEGV` are synchronous faults. `signal-hook`
/// refuses to register them, so they keep their default disposition.
pub const STOP_SIGNALS: [i32; 4] = [SIGINT, SIGTERM, SIGABRT, SIGQUIT];

/// Errors reported while installing signal handlers.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Registering a stop handler failed.
    #[error("failed to install handler for signal {signal}: {source}")]
    Install {
        /// Signal number that could not be hooked.
        signal: i32,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// One-shot flag: the first caller to trip it wins, later callers lose.
#[derive(Debug, Default)]
pub struct ShutdownLatch {
    tripped: AtomicBool,
}

impl ShutdownLatch {
    /// Builds an untripped latch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tripped: AtomicBool::new(false),
        }
    }

    /// Trips the latch. Returns `true` only for the call that tripped it.
    pub fn try_trip(&self) -> bool {
        self.tripped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether the latch has been tripped.
    #[must_use]
    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }
}

type StopAction = Box<dyn Fn() + Send + Sync>;

/// Funnels every stop trigger through a single latch.
///
/// Signal handlers only raise the coordinator's signal flag. The flag is
/// turned into a stop request by [`StopCoordinator::poll_signals`] outside
/// signal context.
pub struct StopCoordinator {
    latch: ShutdownLatch,
    signalled: Arc<AtomicBool>,
    action: StopAction,
}

impl StopCoordinator {
    /// Builds a coordinator that runs `action` once on the first stop request.
    #[must_use]
    pub fn new(action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            latch: ShutdownLatch::new(),
            signalled: Arc::new(AtomicBool::new(false)),
            action: Box::new(action),
        }
    }

    /// Builds a coordinator whose action raises `flag`.
    #[must_use]
    pub fn with_flag(flag: Arc<AtomicBool>) -> Self {
        Self::new(move || flag.store(true, Ordering::Release))
    }

    /// Requests a stop. Returns `true` for the single call that ran the
    /// action.
    pub fn request_stop(&self) -> bool {
        if !self.latch.try_trip() {
            return false;
        }
        (self.action)();
        true
    }

    /// Converts a delivered stop signal into a stop request. Returns `true`
    /// for the single call that ran the action.
    pub fn poll_signals(&self) -> bool {
        self.signalled.load(Ordering::Acquire) && self.request_stop()
    }

    /// Whether a stop signal has been delivered since the handlers were
    /// installed.
    #[must_use]
    pub fn is_signalled(&self) -> bool {
        self.signalled.load(Ordering::Acquire)
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.latch.is_tripped()
    }
}

impl std::fmt::Debug for StopCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopCoordinator")
            .field("latch", &self.latch)
            .field("signalled", &self.signalled)
            .finish_non_exhaustive()
    }
}

/// Installed stop handlers. Dropping the registration unhooks them.
#[derive(Debug)]
pub struct SignalRegistration {
    ids: Vec<SigId>,
}

impl Drop for SignalRegistration {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            low_level::unregister(id);
        }
    }
}

/// Hooks the stop signals to the signal flag of `coordinator`.
///
/// Handlers stay installed after the first delivery, so repeated interrupts
/// only raise the flag again instead of killing the process.
///
/// # Errors
///
/// Returns [`ShutdownError`] when a handler cannot be installed.
pub fn install_signal_handlers(
    coordinator: &StopCoordinator,
) -> Result<SignalRegistration, ShutdownError> {
    let mut registration = SignalRegistration { ids: Vec::new() };
    for signal_number in STOP_SIGNALS {
        let id = flag::register(signal_number, Arc::clone(&coordinator.signalled)).map_err(
            |source| ShutdownError::Install {
                signal: signal_number,
                source,
            },
        )?;
        registration.ids.push(id);
    }
    debug!(
        target: PROCESS_TARGET,
        signals = ?STOP_SIGNALS,
        "stop signal handlers installed"
    );
    Ok(registration)
}
