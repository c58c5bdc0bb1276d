//! Single-step executor.

use pipewright_core::{Payload, Result};
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::transform::Transform;

/// A transform together with its optional passed-in value.
#[derive(Debug)]
pub struct Step {
    transform: Transform,
    passed_in: Option<Value>,
}

impl Step {
    /// Creates a new step.
    pub fn new(transform: Transform, passed_in: Option<Value>) -> Self {
        Self {
            transform,
            passed_in,
        }
    }

    /// Returns the wrapped transform.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Returns the value passed to the transform on every invocation.
    pub fn passed_in(&self) -> Option<&Value> {
        self.passed_in.as_ref()
    }

    /// Invokes the transform with `payload` and the passed-in value.
    pub async fn execute(&self, payload: Payload, ctx: &ExecutionContext) -> Result<Payload> {
        self.transform
            .execute(payload, self.passed_in.as_ref(), ctx)
            .await
    }
}

/// Executes exactly one transform; its output, or failure, is returned untouched.
#[derive(Debug)]
pub struct SingleStep {
    step: Step,
}

impl SingleStep {
    /// Creates a single-step executor.
    pub fn new(transform: Transform, passed_in: Option<Value>) -> Self {
        Self {
            step: Step::new(transform, passed_in),
        }
    }

    /// Returns the wrapped step.
    pub fn step(&self) -> &Step {
        &self.step
    }

    /// Executes the step.
    pub async fn execute(&self, payload: Payload, ctx: &ExecutionContext) -> Result<Payload> {
        self.step.execute(payload, ctx).await
    }
}

impl From<Step> for SingleStep {
    fn from(step: Step) -> Self {
        Self { step }
    }
}
