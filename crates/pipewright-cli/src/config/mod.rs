//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── log: LogConfig       # Log output format
//! └── command: Command     # run | transforms
//! ```
//!
//! All options can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod log;

use clap::Parser;
pub use log::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

use crate::command::Command;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "pipewright")]
#[command(about = "Run series/parallel transform pipelines")]
#[command(version)]
pub struct Cli {
    /// Logging configuration.
    #[clap(flatten)]
    pub log: LogConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before parsing so its variables act as
    /// defaults for the `env` fallbacks of every argument.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}
}
