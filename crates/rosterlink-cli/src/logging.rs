//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! # Log Levels
//!
//! - `error`: fatal errors
//! - `warn`: duplicate names, rows dropped by the join
//! - `info`: per-dataset progress and summary counts
//! - `debug`: per-resolution and per-decision detail without names
//! - `trace`: player names (requires the `--log-data` flag)
//!
//! Player names are personal data. Without `--log-data` the library crates
//! are capped at `debug`, including directives taken from `RUST_LOG`, and
//! names logged by the CLI itself go through [`redact_value`].

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when name logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Crates whose events are governed by the configured level.
const WORKSPACE_CRATES: &[&str] = &[
    "rosterlink",
    "rosterlink_cli",
    "rosterlink_ingest",
    "rosterlink_map",
    "rosterlink_model",
    "rosterlink_output",
];

/// Returns true if name logging is explicitly enabled.
pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Relaxed)
}

/// Returns the input value when name logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level filter for workspace crates.
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override the level when set.
    pub use_env_filter: bool,
    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
    /// Whether to include target (module path) in log output.
    pub with_target: bool,
    /// Whether to use ANSI colors in output.
    pub with_ansi: bool,
    /// Output format.
    pub format: LogFormat,
    /// Optional log file path. When set, logs are written to the file.
    pub log_file: Option<PathBuf>,
    /// Whether player names may be logged.
    pub log_data: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_timestamps: false,
            with_target: false,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
            log_data: false,
        }
    }
}

/// Initialize the global tracing subscriber with the given configuration.
///
/// This should be called once at application startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        init_logging_with_writer(config, SharedFileWriter::new(file));
    } else {
        init_logging_with_writer(config, io::stderr);
    }
    Ok(())
}

/// Initialize logging with a custom writer (useful for testing).
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    LOG_DATA_ENABLED.store(config.log_data, Ordering::Release);
    let filter = build_env_filter(config);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(config.with_target);

            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);

            if config.with_timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .init();
            }
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(config.with_ansi)
                .with_target(config.with_target);

            if config.with_timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.without_time())
                    .init();
            }
        }
    }
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl SharedFileWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<std::fs::File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

/// Build an `EnvFilter` from the config, respecting `RUST_LOG` when allowed.
fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    env_filter(config, from_env.as_deref())
}

fn env_filter(config: &LogConfig, from_env: Option<&str>) -> EnvFilter {
    if config.use_env_filter
        && let Some(raw) = from_env.filter(|raw| !raw.trim().is_empty())
    {
        let directives = if config.log_data {
            raw.to_string()
        } else {
            cap_env_directives(raw)
        };
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }
    EnvFilter::new(filter_directives(config.level_filter, config.log_data))
}

/// Directives for workspace crates; external crates stay at warn.
fn filter_directives(level_filter: LevelFilter, log_data: bool) -> String {
    // Names are only emitted at trace, so without --log-data trace is
    // capped at debug.
    let level = if level_filter == LevelFilter::TRACE && !log_data {
        LevelFilter::DEBUG
    } else {
        level_filter
    };
    let level = level.to_string().to_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        WORKSPACE_CRATES
            .iter()
            .map(|krate| format!("{krate}={level}")),
    );
    directives.join(",")
}

/// Rewrites `RUST_LOG` so no directive reaching workspace crates is above debug.
///
/// Global and span directives count as reaching them. A bare target means
/// every level, so workspace targets without a level get `=debug`.
fn cap_env_directives(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .map(cap_directive)
        .collect::<Vec<_>>()
        .join(",")
}

fn cap_directive(directive: &str) -> String {
    let (target, level) = match directive.rsplit_once('=') {
        Some((target, level)) if level.parse::<LevelFilter>().is_ok() => (target, Some(level)),
        _ if directive.parse::<LevelFilter>().is_ok() => ("", Some(directive)),
        _ => (directive, None),
    };
    let reaches_workspace =
        target.is_empty() || target.starts_with('[') || target.starts_with("rosterlink");
    if !reaches_workspace {
        return directive.to_string();
    }
    let is_trace =
        level.is_none_or(|level| level.parse::<LevelFilter>().ok() == Some(LevelFilter::TRACE));
    if !is_trace {
        directive.to_string()
    } else if target.is_empty() {
        "debug".to_string()
    } else {
        format!("{target}=debug")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_is_capped_without_log_data() {
        let directives = filter_directives(LevelFilter::TRACE, false);
        assert!(directives.contains("rosterlink_map=debug"));
        assert!(!directives.contains("trace"));
    }

    #[test]
    fn trace_allowed_with_log_data() {
        let directives = filter_directives(LevelFilter::TRACE, true);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("rosterlink_map=trace"));
    }

    #[test]
    fn redaction_defaults_on() {
        assert!(!log_data_enabled());
        assert_eq!(redact_value("Mohamed Salah"), REDACTED_VALUE);
    }

    #[test]
    fn rust_log_trace_is_capped_without_log_data() {
        let filter = env_filter(&LogConfig::default(), Some("rosterlink_map=trace"));
        let rendered = filter.to_string();
        assert!(rendered.contains("rosterlink_map=debug"));
        assert!(!rendered.contains("trace"));
    }

    #[test]
    fn rust_log_global_and_module_trace_are_capped() {
        assert_eq!(
            cap_env_directives("trace, rosterlink_map::engine=TRACE,rosterlink_cli"),
            "debug,rosterlink_map::engine=debug,rosterlink_cli=debug"
        );
        assert_eq!(
            cap_env_directives("[resolve]=trace,polars=trace,rosterlink_ingest=info"),
            "[resolve]=debug,polars=trace,rosterlink_ingest=info"
        );
    }

    #[test]
    fn rust_log_passes_through_with_log_data() {
        let config = LogConfig {
            log_data: true,
            ..LogConfig::default()
        };
        let filter = env_filter(&config, Some("rosterlink_map=trace"));
        assert!(filter.to_string().contains("rosterlink_map=trace"));
    }

    #[test]
    fn rust_log_ignored_when_flags_given() {
        let config = LogConfig {
            use_env_filter: false,
            level_filter: LevelFilter::INFO,
            ..LogConfig::default()
        };
        let filter = env_filter(&config, Some("rosterlink_map=trace"));
        assert!(filter.to_string().contains("rosterlink_map=info"));
    }
}
