//! Parallel executor.

use futures::future::join_all;
use pipewright_core::{Error, Payload, Result};

use super::merge::{MergePolicy, attribute_keys};
use super::{MIN_GROUP_LEN, Step};
use crate::context::ExecutionContext;

/// Tracing target for parallel execution.
const TRACING_TARGET: &str = "pipewright_runtime::parallel";

/// Per-branch outcome of one parallel execution.
type Settlement = Result<Payload>;

/// A parallel branch: a step plus the key it contributes under `asAttributes`.
#[derive(Debug)]
pub struct Branch {
    step: Step,
    key: String,
}

impl Branch {
    /// Creates a branch keyed by its transform name.
    pub fn new(step: Step) -> Self {
        let key = step.transform().name().to_owned();
        Self { step, key }
    }

    /// Creates a branch with an explicit attribute key.
    pub fn keyed(key: impl Into<String>, step: Step) -> Self {
        Self {
            step,
            key: key.into(),
        }
    }

    /// Returns the wrapped step.
    pub fn step(&self) -> &Step {
        &self.step
    }

    /// Returns the declared attribute key, before disambiguation.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// A set of steps invoked concurrently against the same input payload.
#[derive(Debug)]
pub struct Parallel {
    branches: Vec<Branch>,
    keys: Vec<String>,
    policy: MergePolicy,
}

impl Parallel {
    /// Creates a parallel group without a length check.
    ///
    /// Used by the fluent builder, which can only produce two or more branches.
    pub(crate) fn new(branches: Vec<Branch>, policy: MergePolicy) -> Self {
        let keys = attribute_keys(branches.iter().map(Branch::key));
        Self {
            branches,
            keys,
            policy,
        }
    }

    /// Creates a parallel group, requiring at least two branches.
    pub fn try_new(branches: Vec<Branch>, policy: MergePolicy) -> Result<Self> {
        if branches.len() < MIN_GROUP_LEN {
            return Err(Error::configuration(format!(
                "minimum length is {MIN_GROUP_LEN} for a parallel"
            )));
        }
        Ok(Self::new(branches, policy))
    }

    /// Returns the branches in declaration order.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Returns the attribute key of each branch, in declaration order.
    pub fn attribute_keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns the merge policy.
    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    /// Executes every branch and merges the results.
    ///
    /// All branches are started before any is awaited, and every branch
    /// settles before the outcome is decided. If any branch failed, all
    /// failures are returned together as a composite error, in declaration
    /// order. Otherwise the outputs are merged by declaration order,
    /// regardless of completion order; a missing merge function is only
    /// reported at this point.
    pub async fn execute(&self, payload: Payload, ctx: &ExecutionContext) -> Result<Payload> {
        tracing::debug!(
            target: TRACING_TARGET,
            path = ctx.path(),
            depth = ctx.depth(),
            branches = self.branches.len(),
            merge = %self.policy.mode(),
            "starting parallel"
        );

        let pending = self.branches.iter().enumerate().map(|(index, branch)| {
            let branch_ctx = ctx.child(format_args!("branch[{index}]"));
            let input = payload.clone();
            async move { branch.step.execute(input, &branch_ctx).await }
        });
        let settlements: Vec<Settlement> = join_all(pending).await;

        let mut outputs = Vec::with_capacity(settlements.len());
        let mut failures = Vec::new();
        for settlement in settlements {
            match settlement {
                Ok(output) => outputs.push(output),
                Err(error) => failures.push(error),
            }
        }

        if !failures.is_empty() {
            tracing::warn!(
                target: TRACING_TARGET,
                path = ctx.path(),
                depth = ctx.depth(),
                failed = failures.len(),
                succeeded = outputs.len(),
                "parallel failed"
            );
            return Err(Error::composite(failures));
        }

        let merged = self.policy.merge(payload, &self.keys, outputs).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = ctx.path(),
            depth = ctx.depth(),
            "parallel completed"
        );
        Ok(merged)
    }
}
