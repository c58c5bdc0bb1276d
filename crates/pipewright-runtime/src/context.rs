//! Per-execution context.

use std::fmt;
use std::sync::Arc;

use pipewright_core::{TimingMark, TimingMarks};

/// Context threaded through one `Pipeline::execute` call.
///
/// Carries the position of the current node for logging (`path`, `depth`)
/// and the timing marks of this execution. Each top-level execution gets a
/// fresh context, so concurrent executions of the same pipeline share
/// nothing.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pipeline: Arc<str>,
    path: String,
    depth: usize,
    marks: TimingMarks,
}

impl ExecutionContext {
    /// Creates the root context of a pipeline execution.
    pub fn new(pipeline: &str, depth: usize) -> Self {
        Self {
            pipeline: Arc::from(pipeline),
            path: pipeline.to_owned(),
            depth,
            marks: TimingMarks::new(),
        }
    }

    /// Returns a context for a nested node, one level deeper.
    pub fn child(&self, segment: impl fmt::Display) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            path: format!("{}/{}", self.path, segment),
            depth: self.depth + 1,
            marks: self.marks.clone(),
        }
    }

    /// Returns the name of the top-level pipeline.
    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    /// Returns the slash-separated position of the current node.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the nesting depth, used for log indentation only.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the timing marks of this execution.
    pub fn marks(&self) -> &TimingMarks {
        &self.marks
    }

    /// Starts a timing mark keyed by `kind` and the current path.
    pub fn start_mark(&self, kind: &str) -> Option<TimingMark> {
        self.marks.start(format!("{kind}:{}", self.path))
    }
}
