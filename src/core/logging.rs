//! Diagnostic logging setup.
//!
//! Logs go to stderr (or `DIARY_LOG_FILE`) so stdout stays clean for command
//! output. `RUST_LOG` takes precedence over everything else.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const LOG_LEVEL_ENV: &str = "DIARY_LOG";
const LOG_FORMAT_ENV: &str = "DIARY_LOG_FORMAT";
const LOG_FILE_ENV: &str = "DIARY_LOG_FILE";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event.
    Json,
    Compact,
}

impl LogFormat {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" | "pretty" => Some(Self::Human),
            "json" | "jsonl" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    /// Parse from a CLI or env value.
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" | "verbose" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Log level from `DIARY_LOG`.
#[must_use]
pub fn level_from_env() -> Option<LogLevel> {
    non_empty_env(LOG_LEVEL_ENV).and_then(|v| LogLevel::from_arg(&v))
}

/// Log format from `DIARY_LOG_FORMAT`.
#[must_use]
pub fn format_from_env() -> Option<LogFormat> {
    non_empty_env(LOG_FORMAT_ENV).and_then(|v| LogFormat::from_arg(&v))
}

/// Log file from `DIARY_LOG_FILE`.
#[must_use]
pub fn file_from_env() -> Option<PathBuf> {
    non_empty_env(LOG_FILE_ENV).map(PathBuf::from)
}

/// Settings for [`init`], merged from CLI flags and environment.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// Merge CLI values over environment values over defaults.
    ///
    /// `verbose` bumps the level to debug unless a more verbose level was
    /// already requested.
    #[must_use]
    pub fn resolve(cli_level: Option<&str>, json_output: bool, verbose: bool) -> Self {
        let mut level = cli_level
            .and_then(LogLevel::from_arg)
            .or_else(level_from_env)
            .unwrap_or_default();
        if verbose && !matches!(level, LogLevel::Trace | LogLevel::Debug) {
            level = LogLevel::Debug;
        }

        let format = if json_output {
            LogFormat::Json
        } else {
            format_from_env().unwrap_or_default()
        };

        Self {
            level,
            format,
            file: file_from_env(),
        }
    }

    /// Filter directive applied when `RUST_LOG` is unset.
    #[must_use]
    pub fn directive(&self) -> String {
        format!("dir_diary={}", self.level.as_filter())
    }
}

/// Open `path` for appending. On failure, say so on stderr and return `None`
/// so logging falls back to stderr.
fn open_log_file(path: &Path) -> Option<File> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!(
                "warning: cannot open log file {}: {e}; logging to stderr",
                path.display()
            );
            None
        }
    }
}

/// Install the global subscriber. Repeated calls are no-ops.
pub fn init(settings: &LogSettings) {
    let writer = settings
        .file
        .as_deref()
        .and_then(open_log_file)
        .map_or_else(|| BoxMakeWriter::new(std::io::stderr), BoxMakeWriter::new);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.directive()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    match settings.format {
        LogFormat::Json => builder.json().with_current_span(false).try_init().ok(),
        LogFormat::Compact => builder.compact().with_target(true).try_init().ok(),
        LogFormat::Human => builder.with_target(false).without_time().try_init().ok(),
    };
}
