//! Pipelines: ordered stages executed strictly left to right.

mod builder;
mod config;

use pipewright_core::{Payload, Result};

pub use self::builder::{Overrides, ParallelBuilder, PipelineBuilder, SeriesBuilder};
pub use self::config::{PipelineConfig, PipelineConfigBuilder, PipelineConfigBuilderError};
use crate::TRACING_TARGET_PIPELINE;
use crate::context::ExecutionContext;
use crate::executor::Stage;

/// An immutable, assembled pipeline.
///
/// Built through [`PipelineBuilder`]. A pipeline can be executed any number
/// of times, also concurrently; every call gets its own [`ExecutionContext`].
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Starts assembling a pipeline with the given name.
    ///
    /// Fails with a configuration error if the name is blank.
    pub fn builder(name: impl Into<String>) -> Result<PipelineBuilder> {
        Ok(PipelineBuilder::new(PipelineConfig::named(name)?))
    }

    /// Starts assembling a pipeline with a full configuration.
    ///
    /// Fails with a configuration error if the configuration is invalid.
    pub fn with_config(config: PipelineConfig) -> Result<PipelineBuilder> {
        config.validate()?;
        Ok(PipelineBuilder::new(config))
    }

    pub(crate) fn from_parts(config: PipelineConfig, stages: Vec<Stage>) -> Self {
        Self { config, stages }
    }

    /// Returns the pipeline name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the stages in execution order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Returns the number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Executes the pipeline against `payload`.
    ///
    /// Each stage receives the previous stage's output. The first failing
    /// stage stops the pipeline and its error is returned; an empty pipeline
    /// returns `payload` unchanged.
    pub async fn execute(&self, payload: Payload) -> Result<Payload> {
        let ctx = ExecutionContext::new(self.name(), self.config.depth);
        self.run(payload, &ctx).await
    }

    /// Executes the pipeline as a stage of an enclosing pipeline.
    pub(crate) async fn execute_nested(
        &self,
        payload: Payload,
        ctx: &ExecutionContext,
    ) -> Result<Payload> {
        let nested = ctx.child(self.name());
        self.run(payload, &nested).await
    }

    async fn run(&self, payload: Payload, ctx: &ExecutionContext) -> Result<Payload> {
        tracing::info!(
            target: TRACING_TARGET_PIPELINE,
            pipeline = self.name(),
            path = ctx.path(),
            depth = ctx.depth(),
            stages = self.stages.len(),
            "starting pipeline"
        );

        let mark = ctx.start_mark("Pipeline");
        let mut current = payload;
        for (index, stage) in self.stages.iter().enumerate() {
            let stage_ctx = ctx.child(format_args!("stage[{index}]"));
            current = match stage.execute(current, &stage_ctx).await {
                Ok(output) => output,
                Err(error) => {
                    let elapsed = mark.map(|mark| mark.finish().elapsed());
                    tracing::error!(
                        target: TRACING_TARGET_PIPELINE,
                        pipeline = self.name(),
                        path = ctx.path(),
                        depth = ctx.depth(),
                        failed_stage = index,
                        stage = stage.label(),
                        elapsed = elapsed.as_deref().unwrap_or_default(),
                        error = %error,
                        "pipeline failed"
                    );
                    return Err(error);
                }
            };
        }

        let elapsed = mark.map(|mark| mark.finish().elapsed());
        tracing::info!(
            target: TRACING_TARGET_PIPELINE,
            pipeline = self.name(),
            path = ctx.path(),
            depth = ctx.depth(),
            elapsed = elapsed.as_deref().unwrap_or_default(),
            "pipeline completed"
        );
        Ok(current)
    }
}
