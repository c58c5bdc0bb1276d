//! Execution nodes.
//!
//! A pipeline is an ordered list of [`Stage`]s. Each stage is one of:
//! - [`SingleStep`]: one transform
//! - [`Series`]: transforms run strictly in order, failing fast
//! - [`Parallel`]: transforms run concurrently, results merged by [`MergePolicy`]
//! - a nested [`Pipeline`]

mod merge;
mod parallel;
mod series;
mod single;

use futures::FutureExt;
use futures::future::BoxFuture;
use pipewright_core::{Payload, Result};

pub use self::merge::{MergeFn, MergeMode, MergePolicy, merge_fn};
pub use self::parallel::{Branch, Parallel};
pub use self::series::Series;
pub use self::single::{SingleStep, Step};
use crate::context::ExecutionContext;
use crate::pipeline::Pipeline;

/// Minimum number of entries in a series or parallel group.
pub const MIN_GROUP_LEN: usize = 2;

/// One stage of a pipeline.
#[derive(Debug)]
pub enum Stage {
    /// A single transform.
    Single(SingleStep),
    /// Transforms executed in order.
    Series(Series),
    /// Transforms executed concurrently.
    Parallel(Parallel),
    /// A nested pipeline.
    Pipeline(Box<Pipeline>),
}

impl Stage {
    /// Returns a short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Single(_) => "single",
            Self::Series(_) => "series",
            Self::Parallel(_) => "parallel",
            Self::Pipeline(_) => "pipeline",
        }
    }

    /// Executes the stage against `payload`.
    ///
    /// Boxed because stages and pipelines nest recursively.
    pub fn execute<'a>(
        &'a self,
        payload: Payload,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<Payload>> {
        async move {
            match self {
                Self::Single(single) => single.execute(payload, ctx).await,
                Self::Series(series) => series.execute(payload, ctx).await,
                Self::Parallel(parallel) => parallel.execute(payload, ctx).await,
                Self::Pipeline(pipeline) => pipeline.execute_nested(payload, ctx).await,
            }
        }
        .boxed()
    }
}

impl From<SingleStep> for Stage {
    fn from(single: SingleStep) -> Self {
        Self::Single(single)
    }
}

impl From<Series> for Stage {
    fn from(series: Series) -> Self {
        Self::Series(series)
    }
}

impl From<Parallel> for Stage {
    fn from(parallel: Parallel) -> Self {
        Self::Parallel(parallel)
    }
}

impl From<Pipeline> for Stage {
    fn from(pipeline: Pipeline) -> Self {
        Self::Pipeline(Box::new(pipeline))
    }
}
