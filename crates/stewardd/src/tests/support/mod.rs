//! Test doubles shared by the supervisor suites.

mod fixtures;
mod reporter;
mod spawner;

pub use fixtures::{CaptureSink, TreeFixture, environment};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use spawner::MockSpawner;

use std::sync::Mutex;

/// Serializes tests that raise process-wide stop signals.
pub static SIGNAL_LOCK: Mutex<()> = Mutex::new(());
