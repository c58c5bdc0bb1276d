//! Pipeline definition types.
//!
//! Serializable descriptions of a pipeline, suitable for JSON files. A
//! definition refers to transforms by their registered name and is turned
//! into an executable [`Pipeline`](crate::pipeline::Pipeline) by
//! [`TransformRegistry::compile`](crate::registry::TransformRegistry::compile).

mod stage;

use pipewright_core::Result;
use serde::{Deserialize, Serialize};

pub use self::stage::{StageDefinition, TransformRef};

/// Serializable pipeline definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDefinition {
    /// Pipeline name; a generated one is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stages in execution order.
    #[serde(default)]
    pub stages: Vec<StageDefinition>,
}

impl PipelineDefinition {
    /// Parses a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the definition to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
