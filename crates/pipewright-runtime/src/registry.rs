//! Transform registry and definition compiler.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use pipewright_core::{Error, Payload, Result};
use serde_json::Value;

use crate::TRACING_TARGET_REGISTRY;
use crate::definition::{PipelineDefinition, StageDefinition, TransformRef};
use crate::executor::{
    Branch, MergeFn, MergeMode, MergePolicy, Parallel, Series, SingleStep, Step, merge_fn,
};
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::transform::{Profile, Transform};

/// Creates a fresh transform instance.
pub type TransformFactory = Arc<dyn Fn() -> Transform + Send + Sync>;

/// Named transform factories and merge functions.
///
/// Compiles [`PipelineDefinition`]s into executable [`Pipeline`]s. Every
/// reference to a transform in a definition produces a fresh instance, so
/// no two stages share one.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: BTreeMap<String, TransformFactory>,
    merge_functions: BTreeMap<String, MergeFn>,
}

impl TransformRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the stock transforms.
    pub fn with_stock() -> Self {
        let mut registry = Self::new();
        crate::stock::register_all(&mut registry);
        registry
    }

    /// Registers a transform factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Transform + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::trace!(target: TRACING_TARGET_REGISTRY, transform = %name, "registering transform");
        self.transforms.insert(name, Arc::new(factory));
        self
    }

    /// Registers a merge function under `name`, replacing any previous one.
    pub fn register_merge_function<F, Fut>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Payload>> + Send + 'static,
    {
        let name = name.into();
        tracing::trace!(target: TRACING_TARGET_REGISTRY, merge_function = %name, "registering merge function");
        self.merge_functions.insert(name, merge_fn(function));
        self
    }

    /// Returns `true` if a transform is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Returns the registered transform names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }

    /// Returns the profile of the transform registered under `name`.
    pub fn profile(&self, name: &str) -> Option<Profile> {
        self.transforms.get(name).map(|factory| factory().profile())
    }

    /// Creates a new instance of the transform registered under `name`.
    ///
    /// The instance is named after its registration.
    pub fn create(&self, name: &str) -> Result<Transform> {
        let factory = self
            .transforms
            .get(name)
            .ok_or_else(|| Error::configuration(format!("unknown transform `{name}`")))?;
        Ok(factory().with_name(name))
    }

    /// Compiles a definition into a pipeline.
    ///
    /// Applies the same assembly rules as the builders: series and parallel
    /// stages need at least two entries. Unknown transform or merge function
    /// names are configuration errors.
    pub fn compile(&self, definition: &PipelineDefinition) -> Result<Pipeline> {
        self.compile_at(definition, 0)
    }

    fn compile_at(&self, definition: &PipelineDefinition, depth: usize) -> Result<Pipeline> {
        let mut config = match &definition.name {
            Some(name) => PipelineConfig::builder().name(name.as_str()).build(),
            None => PipelineConfig::builder().build(),
        }
        .map_err(|error| Error::configuration(error.to_string()))?;
        config.depth = depth;

        let mut builder = Pipeline::with_config(config)?;
        for stage in &definition.stages {
            builder = match stage {
                StageDefinition::Step(reference) => {
                    builder.add_stage(SingleStep::from(self.step(reference)?))
                }
                StageDefinition::Series { steps } => {
                    let steps = steps
                        .iter()
                        .map(|reference| self.step(reference))
                        .collect::<Result<Vec<_>>>()?;
                    builder.add_stage(Series::try_new(steps)?)
                }
                StageDefinition::Parallel {
                    branches,
                    merge,
                    merge_function,
                } => {
                    let policy = self.merge_policy(*merge, merge_function.as_deref())?;
                    let branches = branches
                        .iter()
                        .map(|reference| self.branch(reference))
                        .collect::<Result<Vec<_>>>()?;
                    builder.add_stage(Parallel::try_new(branches, policy)?)
                }
                StageDefinition::Pipeline(nested) => {
                    builder.add_pipeline(self.compile_at(nested, depth + 1)?)
                }
            };
        }

        let pipeline = builder.build();
        tracing::debug!(
            target: TRACING_TARGET_REGISTRY,
            pipeline = pipeline.name(),
            stages = pipeline.len(),
            "compiled pipeline definition"
        );
        Ok(pipeline)
    }

    fn step(&self, reference: &TransformRef) -> Result<Step> {
        let transform = self.create(&reference.transform)?;
        Ok(Step::new(transform, reference.passed_in.clone()))
    }

    fn branch(&self, reference: &TransformRef) -> Result<Branch> {
        let step = self.step(reference)?;
        Ok(match &reference.key {
            Some(key) => Branch::keyed(key.as_str(), step),
            None => Branch::new(step),
        })
    }

    fn merge_policy(&self, mode: MergeMode, function: Option<&str>) -> Result<MergePolicy> {
        match (mode, function) {
            (MergeMode::AsMergeFunction, Some(name)) => {
                let function = self.merge_functions.get(name).ok_or_else(|| {
                    Error::configuration(format!("unknown merge function `{name}`"))
                })?;
                Ok(MergePolicy::from_parts(mode, Some(Arc::clone(function))))
            }
            (MergeMode::AsMergeFunction, None) => Err(Error::configuration(
                "merge mode is asMergeFunction but no merge function was named",
            )),
            (_, Some(name)) => Err(Error::configuration(format!(
                "merge function `{name}` requires merge mode asMergeFunction, not {mode}"
            ))),
            (_, None) => Ok(MergePolicy::new(mode)),
        }
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.transforms.keys().collect::<Vec<_>>())
            .field("merge_functions", &self.merge_functions.keys().collect::<Vec<_>>())
            .finish()
    }
}
