//! Structured logging setup.
//!
//! Library code only emits `tracing` events. Binaries and tests call
//! [`init_logging`] once to install a subscriber driven by:
//!
//! - `MIPGATE_TRACE`: filter directive (`debug`, `mipgate_highs=trace`, ...), default `off`
//! - `MIPGATE_LOG_FORMAT`: `pretty` (default) or `json`
//! - `MIPGATE_LOG_FILE`: optional file receiving a plain copy of every event

use std::env;
use std::fs::{File, OpenOptions};
use std::io;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const TRACE_ENV: &str = "MIPGATE_TRACE";
pub const FORMAT_ENV: &str = "MIPGATE_LOG_FORMAT";
pub const FILE_ENV: &str = "MIPGATE_LOG_FILE";

#[derive(Debug)]
pub enum LoggingError {
    InvalidFilter(String),
    InvalidFormat(String),
    LogFile(io::Error),
    Init(String),
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggingError::InvalidFilter(msg) => write!(f, "invalid log filter: {msg}"),
            LoggingError::InvalidFormat(format) => write!(
                f,
                "invalid {FORMAT_ENV} '{format}' (expected 'json' or 'pretty')"
            ),
            LoggingError::LogFile(err) => write!(f, "failed to open log file: {err}"),
            LoggingError::Init(msg) => write!(f, "failed to initialize logging: {msg}"),
        }
    }
}

impl std::error::Error for LoggingError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self, LoggingError> {
        if value.eq_ignore_ascii_case("pretty") {
            Ok(LogFormat::Pretty)
        } else if value.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Err(LoggingError::InvalidFormat(value.to_string()))
        }
    }
}

/// Build the filter for a level string; `off` disables everything.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if level.eq_ignore_ascii_case("off") {
        Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
    } else {
        EnvFilter::try_new(level).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
    }
}

fn open_log_file(path: &str) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(LoggingError::LogFile)
}

/// Install the global subscriber.
///
/// `level` overrides `MIPGATE_TRACE`. Returns `Ok(false)` if a subscriber is
/// already installed.
pub fn init_logging(level: Option<&str>) -> Result<bool, LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level = level
        .map(str::to_string)
        .or_else(|| env::var(TRACE_ENV).ok())
        .unwrap_or_else(|| "off".to_string());
    let filter = build_filter(&level)?;
    let format = LogFormat::parse(&env::var(FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string()))?;
    let file = env::var(FILE_ENV).ok().map(|path| open_log_file(&path)).transpose()?;

    let file_layer = file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
    });
    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let result = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).pretty())
            .try_init(),
    };
    result.map_err(|err| LoggingError::Init(err.to_string()))?;
    Ok(true)
}
