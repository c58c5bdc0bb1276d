//! Logging configuration.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging options.
///
/// The level filter is taken from `RUST_LOG` and defaults to `info`.
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct LogConfig {
    /// Format of log events written to stderr.
    #[arg(
        long = "log-format",
        global = true,
        env = "PIPEWRIGHT_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    #[serde(default)]
    pub format: LogFormat,
}
