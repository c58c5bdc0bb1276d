//! Series executor.

use pipewright_core::{Error, Payload, Result};

use super::{MIN_GROUP_LEN, Step};
use crate::context::ExecutionContext;

/// Tracing target for series execution.
const TRACING_TARGET: &str = "pipewright_runtime::series";

/// An ordered sequence of steps; each output is the next step's input.
#[derive(Debug)]
pub struct Series {
    steps: Vec<Step>,
}

impl Series {
    /// Creates a series without a length check.
    ///
    /// Used by the fluent builder, which can only produce two or more steps.
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Creates a series, requiring at least two steps.
    pub fn try_new(steps: Vec<Step>) -> Result<Self> {
        if steps.len() < MIN_GROUP_LEN {
            return Err(Error::configuration(format!(
                "minimum length is {MIN_GROUP_LEN} for a series"
            )));
        }
        Ok(Self::new(steps))
    }

    /// Returns the steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Executes the steps strictly in order.
    ///
    /// The first failure stops the series; later steps never run and the
    /// failure is returned as is.
    pub async fn execute(&self, payload: Payload, ctx: &ExecutionContext) -> Result<Payload> {
        tracing::debug!(
            target: TRACING_TARGET,
            path = ctx.path(),
            depth = ctx.depth(),
            steps = self.steps.len(),
            "starting series"
        );

        let mut current = payload;
        for (index, step) in self.steps.iter().enumerate() {
            let step_ctx = ctx.child(format_args!("step[{index}]"));
            current = match step.execute(current, &step_ctx).await {
                Ok(output) => output,
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        path = ctx.path(),
                        depth = ctx.depth(),
                        failed_step = index,
                        skipped = self.steps.len() - index - 1,
                        "series failed"
                    );
                    return Err(error);
                }
            };
        }

        tracing::debug!(
            target: TRACING_TARGET,
            path = ctx.path(),
            depth = ctx.depth(),
            "series completed"
        );
        Ok(current)
    }
}
