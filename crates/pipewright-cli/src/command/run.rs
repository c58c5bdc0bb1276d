//! `pipewright run`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use pipewright_runtime::Payload;
use pipewright_runtime::definition::PipelineDefinition;
use pipewright_runtime::registry::TransformRegistry;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::TRACING_TARGET_COMMAND;

/// Arguments of the `run` command.
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct RunArgs {
    /// Path to the JSON pipeline definition.
    #[arg(long, short = 'd', env = "PIPEWRIGHT_DEFINITION")]
    pub definition: PathBuf,

    /// Path to a JSON file holding the input payload.
    #[arg(long, short = 'p', env = "PIPEWRIGHT_PAYLOAD", conflicts_with = "input")]
    pub payload: Option<PathBuf>,

    /// Input payload as inline JSON.
    #[arg(long, short = 'i')]
    pub input: Option<String>,

    /// Pretty-print the output payload.
    #[arg(long)]
    #[serde(default)]
    pub pretty: bool,
}

/// Compiles the definition, executes it and prints the output payload.
///
/// Nothing is printed for an empty output payload.
pub async fn execute(args: RunArgs, registry: &TransformRegistry) -> anyhow::Result<()> {
    let definition = load_definition(&args.definition).await?;
    let pipeline = registry
        .compile(&definition)
        .with_context(|| format!("invalid pipeline definition {}", args.definition.display()))?;

    let payload = load_payload(args.payload.as_deref(), args.input.as_deref()).await?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        pipeline = pipeline.name(),
        stages = pipeline.len(),
        empty_input = payload.is_empty(),
        "running pipeline"
    );

    let output = pipeline
        .execute(payload)
        .await
        .with_context(|| format!("pipeline `{}` failed", pipeline.name()))?;

    if let Some(rendered) = render(&output, args.pretty)? {
        println!("{rendered}");
    }
    Ok(())
}

async fn load_definition(path: &Path) -> anyhow::Result<PipelineDefinition> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read definition {}", path.display()))?;
    PipelineDefinition::from_json(&json)
        .with_context(|| format!("failed to parse definition {}", path.display()))
}

async fn load_payload(path: Option<&Path>, inline: Option<&str>) -> anyhow::Result<Payload> {
    let json = match (path, inline) {
        (Some(path), _) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read payload {}", path.display()))?,
        (None, Some(inline)) => inline.to_owned(),
        (None, None) => return Ok(Payload::empty()),
    };

    let value: Value = serde_json::from_str(&json).context("payload is not valid JSON")?;
    Ok(Payload::new(value))
}

fn render(output: &Payload, pretty: bool) -> anyhow::Result<Option<String>> {
    let Some(value) = output.as_value() else {
        return Ok(None);
    };
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(Some(rendered))
}
