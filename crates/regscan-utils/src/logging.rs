//! # Logging Utilities
//!
//! Logging infrastructure for regscan using `tracing`.
//!
//! Standard output belongs to the tool's own status lines, so every log
//! record goes to standard error (and optionally to a file). This module
//! provides:
//! - Pretty (human-readable) or JSON output
//! - Environment variable configuration
//! - Log level filtering, with a command-line override
//! - An optional daily-rolling log file written off the tracing thread
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use regscan_utils::{init_logging, LoggingConfig};
//!
//! let config = LoggingConfig::from_env().unwrap_or_default();
//! let _guard = init_logging(&config).expect("Failed to initialize logging");
//!
//! tracing::warn!("Visible by default");
//! tracing::info!("Visible with --log-level info or RUST_LOG=info");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Level filter (e.g. `RUST_LOG=debug`, `RUST_LOG=regscan_core=trace`)
//! - `REGSCAN_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `REGSCAN_LOG_FILE`: Optional path to a log file, in addition to stderr
//!
//! ## Filter Priority
//!
//! 1. An explicit level (the `--log-level` flag)
//! 2. `RUST_LOG`
//! 3. `warn`

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fmt as std_fmt};

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "REGSCAN_LOG_FORMAT";
/// Environment variable naming an extra log file
pub const LOG_FILE_ENV: &str = "REGSCAN_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// JSON format, one object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level (default)
    Warn,
    /// Info level
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl LogLevel
{
    /// Lowercase name, as accepted by `EnvFilter` directives.
    #[must_use]
    pub const fn as_str(self) -> &'static str
    {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std_fmt::Display for LogLevel
{
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result
    {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Where and how to log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig
{
    /// Explicit level; overrides `RUST_LOG` when set
    pub level: Option<LogLevel>,
    /// Output format for both stderr and the file
    pub format: LogFormat,
    /// Optional log file, rolled daily
    pub file: Option<PathBuf>,
}

impl LoggingConfig
{
    /// Read `REGSCAN_LOG_FORMAT` and `REGSCAN_LOG_FILE`
    ///
    /// ## Errors
    ///
    /// `InvalidFormat` if `REGSCAN_LOG_FORMAT` is set to an unknown format.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        Self::from_vars(env::var(LOG_FORMAT_ENV).ok().as_deref(), env::var(LOG_FILE_ENV).ok().as_deref())
    }

    /// Build a config from raw variable values (`None` = unset).
    ///
    /// ## Errors
    ///
    /// `InvalidFormat` if `format` names an unknown format.
    pub fn from_vars(format: Option<&str>, file: Option<&str>) -> Result<Self, LoggingError>
    {
        let format = match format {
            Some(raw) if !raw.is_empty() => raw.parse().map_err(LoggingError::InvalidFormat)?,
            _ => LogFormat::default(),
        };
        let file = file.filter(|path| !path.is_empty()).map(PathBuf::from);

        Ok(Self {
            level: None,
            format,
            file,
        })
    }

    /// Override the level filter (e.g. from `--log-level`).
    #[must_use]
    pub fn with_level(mut self, level: Option<LogLevel>) -> Self
    {
        if level.is_some() {
            self.level = level;
        }
        self
    }
}

/// Keeps the background log-file writer alive
///
/// Buffered file records are flushed when this is dropped, so hold it for
/// the lifetime of `main`.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard
{
    _file_writer: Option<WorkerGuard>,
}

/// Build the level filter from an explicit level and a `RUST_LOG` value
///
/// ## Errors
///
/// `InvalidLevel` if `rust_log` is not a valid filter directive list.
pub fn build_filter(level: Option<LogLevel>, rust_log: Option<&str>) -> Result<EnvFilter, LoggingError>
{
    match (level, rust_log) {
        (Some(level), _) => Ok(EnvFilter::new(level.as_str())),
        (None, Some(directives)) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).map_err(|e| LoggingError::InvalidLevel(format!("{directives}: {e}")))
        }
        _ => Ok(EnvFilter::new(LogLevel::Warn.as_str())),
    }
}

/// Initialize the global subscriber
///
/// ## Example
///
/// ```rust,no_run
/// use regscan_utils::{init_logging, LogLevel, LoggingConfig};
///
/// let config = LoggingConfig::default().with_level(Some(LogLevel::Debug));
/// let _guard = init_logging(&config).expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if:
/// - `RUST_LOG` is not a valid filter (and no explicit level was given)
/// - The log file's directory cannot be used
/// - A global subscriber is already installed
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError>
{
    let rust_log = env::var("RUST_LOG").ok();
    let filter = || build_filter(config.level, rust_log.as_deref());

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.format, filter()?)];

    let mut file_writer = None;
    if let Some(path) = &config.file {
        let (writer, guard) = file_appender(path)?;
        layers.push(file_layer(config.format, writer, filter()?));
        file_writer = Some(guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;

    Ok(LoggingGuard {
        _file_writer: file_writer,
    })
}

/// Stderr layer; colour only when stderr is a terminal.
fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer(format: LogFormat, writer: NonBlocking, filter: EnvFilter) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false) // No ANSI in files
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

/// Daily-rolling appender for `path`, written from a background thread.
fn file_appender(path: &Path) -> Result<(NonBlocking, WorkerGuard), LoggingError>
{
    let Some(file_name) = path.file_name() else {
        return Err(LoggingError::FileError(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a file", path.display()),
        )));
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::daily(directory, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("WARN").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_config_from_vars_defaults()
    {
        let config = LoggingConfig::from_vars(None, None).unwrap();
        assert_eq!(config, LoggingConfig::default());

        let config = LoggingConfig::from_vars(Some(""), Some("")).unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.file, None);
    }

    #[test]
    fn test_config_from_vars_reads_values()
    {
        let config = LoggingConfig::from_vars(Some("json"), Some("/tmp/regscan.log")).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/regscan.log")));
    }

    #[test]
    fn test_config_from_vars_rejects_unknown_format()
    {
        let result = LoggingConfig::from_vars(Some("xml"), None);
        assert!(matches!(result, Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_with_level_only_overrides_when_set()
    {
        let config = LoggingConfig::default().with_level(Some(LogLevel::Debug));
        assert_eq!(config.level, Some(LogLevel::Debug));
        assert_eq!(config.with_level(None).level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_build_filter_priority()
    {
        let explicit = build_filter(Some(LogLevel::Trace), Some("error")).unwrap();
        assert_eq!(explicit.max_level_hint(), Some(LevelFilter::TRACE));

        let from_env = build_filter(None, Some("regscan_core=debug")).unwrap();
        assert_eq!(from_env.max_level_hint(), Some(LevelFilter::DEBUG));

        let fallback = build_filter(None, Some("  ")).unwrap();
        assert_eq!(fallback.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_build_filter_rejects_garbage()
    {
        let result = build_filter(None, Some("regscan_core=notalevel"));
        assert!(matches!(result, Err(LoggingError::InvalidLevel(_))));
    }
}
