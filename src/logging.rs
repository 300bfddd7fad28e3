//! Logging setup for the `cpm` and `cpm-http` binaries using `tracing` +
//! `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `CPM_LOG` environment variable (a level such as "debug", or any
//!    `EnvFilter` directive such as "cpm_schedule=trace")
//! 3. default to `info`
//!
//! Output goes to stderr so that reports written to stdout stay parseable.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "CPM_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn build_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Initialise global logging subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(cli_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

