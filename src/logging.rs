//! Logging setup
//!
//! Structured logging goes through `tracing`. The binary installs a
//! `tracing-subscriber` registry writing to stderr, so rendered diagrams on
//! stdout stay clean. Library users install their own subscriber.
//!
//! # Environment Variables
//!
//! - `CODEVISION_LOG_LEVEL`: filter directive (`trace`, `debug`, `info`, `warn`, `error`, or a full `EnvFilter` string)
//! - `RUST_LOG`: used when `CODEVISION_LOG_LEVEL` is unset
//! - `CODEVISION_LOG_FORMAT`: `compact`, `pretty` or `json`
//!
//! ```bash
//! # Show heuristic extractor details only
//! RUST_LOG="info,codevision::parser=debug" codevision analyze ./project
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{
    fmt::{self as layer, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        })
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Filter directive: parameter, then `CODEVISION_LOG_LEVEL`, then `RUST_LOG`, then `info`
fn resolve_level(level: Option<&str>) -> String {
    level
        .map(str::to_string)
        .or_else(|| std::env::var("CODEVISION_LOG_LEVEL").ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

/// Format: parameter, then `CODEVISION_LOG_FORMAT`, then compact
fn resolve_format(format: Option<LogFormat>) -> Result<LogFormat> {
    if let Some(format) = format {
        return Ok(format);
    }
    match std::env::var("CODEVISION_LOG_FORMAT") {
        Ok(value) => LogFormat::from_str(&value).map_err(|e| Error::config_validation(format!("Invalid log format: {}", e))),
        Err(_) => Ok(LogFormat::default()),
    }
}

/// Install the global tracing subscriber.
///
/// Fails if the format from the environment is invalid or a subscriber is
/// already installed. An invalid level falls back to `info`.
pub fn init_logging(level: Option<&str>, format: Option<LogFormat>) -> Result<()> {
    let log_level = resolve_level(level);
    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let format = resolve_format(format)?;

    let installed = match format {
        LogFormat::Compact => Registry::default()
            .with(filter)
            .with(
                layer::Layer::default()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_level(true)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init(),
        LogFormat::Pretty => Registry::default()
            .with(filter)
            .with(
                layer::Layer::default()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .pretty(),
            )
            .try_init(),
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(
                layer::Layer::default()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .json(),
            )
            .try_init(),
    };

    installed.map_err(|e| Error::other(format!("failed to install log subscriber: {}", e)))
}
