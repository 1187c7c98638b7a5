//! Runtime settings for the Steward supervisor.
//!
//! Settings are layered by [`ortho_config`]: built-in defaults, then an
//! optional TOML file (`--config-path` or `STEWARD_CONFIG_PATH`), then
//! `STEWARD_*` environment variables, then command-line flags. These settings
//! govern the supervisor itself; the configuration tree that describes the
//! managed database lives in the document at [`Config::tree_path`].

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

mod defaults;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TICK_INTERVAL_MS, DEFAULT_TREE_PATH, default_log_filter,
    default_log_filter_string, default_log_format, default_tick_interval_ms, default_tree_path,
};

/// Format of the supervisor's own diagnostics on stderr.
///
/// Server log lines echoed on stdout are plain text whatever the format.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// One human-readable line per event.
    #[default]
    Compact,
}

impl LogFormat {
    /// Whether events should carry ANSI colour codes when stderr is
    /// `interactive`. JSON output never does.
    #[must_use]
    pub const fn uses_ansi(self, interactive: bool) -> bool {
        matches!(self, Self::Compact) && interactive
    }
}

/// Supervisor settings resolved from every configuration layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "STEWARD")]
pub struct Config {
    /// Path to the JSON document holding the configuration tree.
    #[ortho_config(default = defaults::default_tree_path())]
    pub tree_path: Utf8PathBuf,
    /// Address substituted for `[subnet]` placeholders. Detected when unset.
    pub network_address: Option<String>,
    /// Directory substituted for `[object]` placeholders. Falls back to the
    /// tree document's directory, then the working directory.
    pub deploy_dir: Option<Utf8PathBuf>,
    /// Tracing filter expression.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for the supervisor's own logs.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Milliseconds between ticks of the supervisor loop.
    #[ortho_config(default = defaults::default_tick_interval_ms())]
    pub tick_interval_ms: u64,
    /// Send `SIGTERM` to the managed server when the supervisor stops instead
    /// of leaving it running.
    #[ortho_config(default = false)]
    pub terminate_on_stop: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tree_path: default_tree_path(),
            network_address: None,
            deploy_dir: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            tick_interval_ms: default_tick_interval_ms(),
            terminate_on_stop: false,
        }
    }
}

impl Config {
    /// Location of the configuration tree document.
    #[must_use]
    pub fn tree_path(&self) -> &Utf8Path {
        self.tree_path.as_path()
    }

    /// Explicit network address override, if any.
    #[must_use]
    pub fn network_address(&self) -> Option<&str> {
        self.network_address.as_deref()
    }

    /// Explicit deployment directory override, if any.
    #[must_use]
    pub fn deploy_dir(&self) -> Option<&Utf8Path> {
        self.deploy_dir.as_deref()
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for supervisor logs.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Interval between supervisor ticks. Never shorter than one millisecond.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Whether the managed server should be terminated on stop.
    #[must_use]
    pub fn terminate_on_stop(&self) -> bool {
        self.terminate_on_stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_published_constants() {
        let config = Config::default();
        assert_eq!(config.tree_path(), Utf8Path::new(DEFAULT_TREE_PATH));
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(
            config.tick_interval(),
            Duration::from_millis(DEFAULT_TICK_INTERVAL_MS)
        );
        assert!(!config.terminate_on_stop());
        assert!(config.network_address().is_none());
        assert!(config.deploy_dir().is_none());
    }

    #[rstest]
    fn zero_tick_interval_is_clamped() {
        let config = Config {
            tick_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("COMPACT", LogFormat::Compact)]
    fn log_format_parses_case_insensitively(#[case] text: &str, #[case] expected: LogFormat) {
        let parsed: LogFormat = text.parse().expect("format should parse");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case(LogFormat::Compact, true, true)]
    #[case(LogFormat::Compact, false, false)]
    #[case(LogFormat::Json, true, false)]
    fn colour_follows_format_and_terminal(
        #[case] format: LogFormat,
        #[case] interactive: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(format.uses_ansi(interactive), expected);
    }

    #[rstest]
    fn log_format_rejects_unknown_values() {
        assert!("pretty".parse::<LogFormat>().is_err());
    }
}
