//! Tracing subscriber setup for servers embedding the game
//!
//! The library only emits `tracing` events: admin commands and resets at
//! `info`, phase transitions at `debug`, ignored events, rejected setups
//! and skipped question files at `warn`. A binary hosting the game builds
//! [`LoggingOptions`] from its own configuration and calls
//! [`LoggingOptions::init`] once at startup.

use std::io::IsTerminal;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Environment variable whose filter directives replace the configured ones
pub const LOG_LEVEL_ENV: &str = "FEUD_LOG_LEVEL";

/// How log lines are written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text, colored when stderr is a terminal
    #[default]
    Human,
    /// One JSON object per line, for log collectors
    Json,
}

/// Logging configuration of a hosting server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Output format
    pub format: LogFormat,
    /// How chatty the game is; dependencies always stay at `warn`
    pub verbosity: u8,
}

/// Builds the filter directives for a verbosity level
///
/// Only this crate's events follow the verbosity; everything else is kept
/// at `warn` until the level reaches 3, where all targets trace.
pub fn directives(verbosity: u8) -> String {
    let crate_name = env!("CARGO_PKG_NAME");
    match verbosity {
        0 => "warn".to_owned(),
        1 => format!("warn,{crate_name}=info"),
        2 => format!("warn,{crate_name}=debug"),
        _ => "trace".to_owned(),
    }
}

impl LoggingOptions {
    /// Installs the global tracing subscriber
    ///
    /// Valid directives in `FEUD_LOG_LEVEL` take precedence over
    /// `verbosity`. Calling this again once a subscriber is installed
    /// does nothing.
    pub fn init(self) {
        let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
            .unwrap_or_else(|_| EnvFilter::new(directives(self.verbosity)));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.verbosity >= 2)
            .with_writer(std::io::stderr);

        let _ = match self.format {
            LogFormat::Human => builder
                .with_ansi(
                    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
                )
                .try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
    }
}
