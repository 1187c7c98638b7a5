use camino::Utf8PathBuf;

use crate::LogFormat;

/// Default location of the configuration tree document.
pub const DEFAULT_TREE_PATH: &str = "config.json";

/// Default log filter expression used by the supervisor.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default interval between supervisor ticks, in milliseconds (six ticks per
/// second).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 166;

/// Default log filter expression used by the supervisor.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the supervisor.
///
/// The supervisor usually runs attached to a terminal, so the compact
/// single-line format is preferred over JSON.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default path of the configuration tree document.
pub fn default_tree_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_TREE_PATH)
}

/// Default tick interval in milliseconds.
pub fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}
