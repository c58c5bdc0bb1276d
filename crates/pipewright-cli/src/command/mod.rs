//! CLI subcommands.

mod run;
mod transforms;

use clap::Subcommand;
use pipewright_runtime::registry::TransformRegistry;
use serde::{Deserialize, Serialize};

pub use self::run::RunArgs;

/// Available subcommands.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Compile a pipeline definition and run it against a payload.
    Run(RunArgs),
    /// List the registered transforms and their profiles.
    Transforms,
}

impl Command {
    /// Executes the command against the stock transform registry.
    pub async fn execute(self) -> anyhow::Result<()> {
        let registry = TransformRegistry::with_stock();
        match self {
            Self::Run(args) => run::execute(args, &registry).await,
            Self::Transforms => {
                transforms::execute(&registry);
                Ok(())
            }
        }
    }
}
