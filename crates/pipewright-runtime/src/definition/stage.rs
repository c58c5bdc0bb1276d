//! Stage definition types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PipelineDefinition;
use crate::executor::MergeMode;

/// Reference to a registered transform, plus its passed-in value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRef {
    /// Registered transform name.
    pub transform: String,
    /// Value passed to the transform on every invocation.
    #[serde(rename = "with", default, skip_serializing_if = "Option::is_none")]
    pub passed_in: Option<Value>,
    /// Attribute key when used as a parallel branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl TransformRef {
    /// References a transform without a passed-in value.
    pub fn new(transform: impl Into<String>) -> Self {
        Self {
            transform: transform.into(),
            passed_in: None,
            key: None,
        }
    }

    /// Sets the passed-in value.
    pub fn with(mut self, passed_in: impl Into<Value>) -> Self {
        self.passed_in = Some(passed_in.into());
        self
    }

    /// Sets the attribute key.
    pub fn keyed(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// One stage of a pipeline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageDefinition {
    /// A single transform.
    Step(TransformRef),
    /// Transforms executed in order.
    Series {
        /// Steps in execution order; at least two.
        steps: Vec<TransformRef>,
    },
    /// Transforms executed concurrently.
    #[serde(rename_all = "camelCase")]
    Parallel {
        /// Branches in declaration order; at least two.
        branches: Vec<TransformRef>,
        /// How branch outputs are reconciled.
        #[serde(default)]
        merge: MergeMode,
        /// Registered merge function, for `asMergeFunction`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        merge_function: Option<String>,
    },
    /// A nested pipeline.
    Pipeline(PipelineDefinition),
}
