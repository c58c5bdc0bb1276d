//! Fluent pipeline assembly.
//!
//! Builders accumulate stage descriptors and produce one immutable
//! [`Pipeline`] at the end. Group builders ([`SeriesBuilder`],
//! [`ParallelBuilder`]) can only be closed after a second entry, so groups
//! assembled through them always satisfy the minimum length.

use pipewright_core::{Error, Result};
use serde_json::Value;

use super::{Pipeline, PipelineConfig};
use crate::executor::{Branch, MIN_GROUP_LEN, MergePolicy, Parallel, Series, SingleStep, Stage, Step};
use crate::transform::Transform;

/// Passed-in values for a bulk assembly helper.
#[derive(Debug, Clone, Default)]
pub enum Overrides {
    /// No transform receives a passed-in value.
    #[default]
    None,
    /// Every transform receives the same value.
    Shared(Value),
    /// One value per transform, matched by position.
    Each(Vec<Option<Value>>),
}

impl Overrides {
    /// Expands the overrides into one entry per transform.
    fn expand(self, len: usize) -> Result<Vec<Option<Value>>> {
        match self {
            Self::None => Ok(vec![None; len]),
            Self::Shared(value) => Ok(vec![Some(value); len]),
            Self::Each(values) if values.len() == len => Ok(values),
            Self::Each(values) => Err(length_mismatch(len, values.len())),
        }
    }
}

fn length_mismatch(transforms: usize, overrides: usize) -> Error {
    Error::configuration(format!(
        "array lengths do not match: {transforms} transforms, {overrides} passed-in values"
    ))
}

fn check_group(transforms: usize, overrides: usize, group: &str) -> Result<()> {
    if transforms != overrides {
        return Err(length_mismatch(transforms, overrides));
    }
    if transforms < MIN_GROUP_LEN {
        return Err(Error::configuration(format!(
            "minimum length is {MIN_GROUP_LEN} for a {group}"
        )));
    }
    Ok(())
}

/// Assembles a [`Pipeline`].
#[derive(Debug)]
#[must_use = "a pipeline builder does nothing until `build` is called"]
pub struct PipelineBuilder {
    config: PipelineConfig,
    stages: Vec<Stage>,
}

impl PipelineBuilder {
    pub(crate) fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            stages: Vec::new(),
        }
    }

    /// Appends an already constructed stage.
    pub fn add_stage(mut self, stage: impl Into<Stage>) -> Self {
        self.stages.push(stage.into());
        self
    }

    /// Appends a single transform.
    pub fn add_step(self, transform: Transform, passed_in: Option<Value>) -> Self {
        self.add_stage(SingleStep::new(transform, passed_in))
    }

    /// Appends each transform as its own single step.
    ///
    /// Fails if `overrides` is [`Overrides::Each`] with a different length
    /// than `transforms`.
    pub fn add_steps(mut self, transforms: Vec<Transform>, overrides: Overrides) -> Result<Self> {
        let overrides = overrides.expand(transforms.len())?;
        for (transform, passed_in) in transforms.into_iter().zip(overrides) {
            self = self.add_step(transform, passed_in);
        }
        Ok(self)
    }

    /// Appends one single step per passed-in value, each with a fresh
    /// transform from `factory`.
    pub fn add_repeated<F>(mut self, factory: F, passed_ins: Vec<Value>) -> Self
    where
        F: Fn() -> Transform,
    {
        for passed_in in passed_ins {
            self = self.add_step(factory(), Some(passed_in));
        }
        self
    }

    /// Starts a series with its first step.
    pub fn add_series(self, transform: Transform, passed_in: Option<Value>) -> SeriesBuilder {
        SeriesBuilder {
            pipeline: self,
            steps: vec![Step::new(transform, passed_in)],
        }
    }

    /// Starts a parallel group with its first branch, keyed by transform name.
    pub fn add_parallel(self, transform: Transform, passed_in: Option<Value>) -> ParallelBuilder {
        ParallelBuilder {
            pipeline: self,
            branches: vec![Branch::new(Step::new(transform, passed_in))],
        }
    }

    /// Starts a parallel group with an explicitly keyed first branch.
    pub fn add_parallel_keyed(
        self,
        key: impl Into<String>,
        transform: Transform,
        passed_in: Option<Value>,
    ) -> ParallelBuilder {
        ParallelBuilder {
            pipeline: self,
            branches: vec![Branch::keyed(key, Step::new(transform, passed_in))],
        }
    }

    /// Appends a series built from parallel arrays of transforms and
    /// passed-in values.
    ///
    /// Fails if the lengths differ or fewer than two transforms are given.
    pub fn series(self, transforms: Vec<Transform>, passed_ins: Vec<Option<Value>>) -> Result<Self> {
        check_group(transforms.len(), passed_ins.len(), "series")?;
        let steps = transforms
            .into_iter()
            .zip(passed_ins)
            .map(|(transform, passed_in)| Step::new(transform, passed_in))
            .collect();
        Ok(self.add_stage(Series::new(steps)))
    }

    /// Appends a parallel group built from parallel arrays of transforms and
    /// passed-in values.
    ///
    /// Fails if the lengths differ or fewer than two transforms are given.
    pub fn parallels(
        self,
        transforms: Vec<Transform>,
        policy: impl Into<MergePolicy>,
        passed_ins: Vec<Option<Value>>,
    ) -> Result<Self> {
        check_group(transforms.len(), passed_ins.len(), "parallel")?;
        let branches = transforms
            .into_iter()
            .zip(passed_ins)
            .map(|(transform, passed_in)| Branch::new(Step::new(transform, passed_in)))
            .collect();
        Ok(self.add_stage(Parallel::new(branches, policy.into())))
    }

    /// Appends another pipeline as a single stage.
    pub fn add_pipeline(self, pipeline: Pipeline) -> Self {
        self.add_stage(pipeline)
    }

    /// Returns the number of stages added so far.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if no stage was added yet.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Finishes assembly.
    pub fn build(self) -> Pipeline {
        Pipeline::from_parts(self.config, self.stages)
    }
}

/// Assembles a series stage; see [`PipelineBuilder::add_series`].
#[derive(Debug)]
#[must_use = "a series is only added to the pipeline by `end`"]
pub struct SeriesBuilder {
    pipeline: PipelineBuilder,
    steps: Vec<Step>,
}

impl SeriesBuilder {
    /// Adds a step to the series.
    pub fn then(mut self, transform: Transform, passed_in: Option<Value>) -> Self {
        self.steps.push(Step::new(transform, passed_in));
        self
    }

    /// Adds the last step and appends the series to the pipeline.
    pub fn end(mut self, transform: Transform, passed_in: Option<Value>) -> PipelineBuilder {
        self.steps.push(Step::new(transform, passed_in));
        self.pipeline.add_stage(Series::new(self.steps))
    }
}

/// Assembles a parallel stage; see [`PipelineBuilder::add_parallel`].
#[derive(Debug)]
#[must_use = "a parallel group is only added to the pipeline by `end`"]
pub struct ParallelBuilder {
    pipeline: PipelineBuilder,
    branches: Vec<Branch>,
}

impl ParallelBuilder {
    /// Adds a branch keyed by its transform name.
    pub fn also(mut self, transform: Transform, passed_in: Option<Value>) -> Self {
        self.branches
            .push(Branch::new(Step::new(transform, passed_in)));
        self
    }

    /// Adds a branch with an explicit attribute key.
    pub fn also_keyed(
        mut self,
        key: impl Into<String>,
        transform: Transform,
        passed_in: Option<Value>,
    ) -> Self {
        self.branches
            .push(Branch::keyed(key, Step::new(transform, passed_in)));
        self
    }

    /// Adds the last branch and appends the group to the pipeline.
    pub fn end(
        self,
        transform: Transform,
        policy: impl Into<MergePolicy>,
        passed_in: Option<Value>,
    ) -> PipelineBuilder {
        self.also(transform, passed_in).finish(policy.into())
    }

    /// Adds an explicitly keyed last branch and appends the group to the pipeline.
    pub fn end_keyed(
        self,
        key: impl Into<String>,
        transform: Transform,
        policy: impl Into<MergePolicy>,
        passed_in: Option<Value>,
    ) -> PipelineBuilder {
        self.also_keyed(key, transform, passed_in)
            .finish(policy.into())
    }

    fn finish(self, policy: MergePolicy) -> PipelineBuilder {
        self.pipeline
            .add_stage(Parallel::new(self.branches, policy))
    }
}
