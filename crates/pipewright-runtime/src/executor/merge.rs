//! Merge policies for parallel groups.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use pipewright_core::{Error, Payload, Result, deep_merge};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

/// Caller-supplied merge logic for [`MergeMode::AsMergeFunction`].
///
/// Receives the defined branch outputs in branch declaration order.
pub type MergeFn = Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Payload>> + Send + Sync>;

/// Wraps an async closure into a shared [`MergeFn`].
pub fn merge_fn<F, Fut>(function: F) -> MergeFn
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Payload>> + Send + 'static,
{
    Arc::new(move |outputs: Vec<Value>| -> BoxFuture<'static, Result<Payload>> {
        Box::pin(function(outputs))
    })
}

/// How a parallel group reconciles its branch outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum MergeMode {
    /// Discard branch outputs; the result is empty.
    Void,
    /// Discard branch outputs; the result is the group's input payload.
    #[default]
    AsPipedIn,
    /// One attribute per branch with a defined output.
    AsAttributes,
    /// Deep merge of all defined outputs, later branches winning.
    AsMerged,
    /// Hand the defined outputs to a caller-supplied function.
    AsMergeFunction,
}

/// Merge mode plus, for [`MergeMode::AsMergeFunction`], the function to use.
#[derive(Clone, Default)]
pub struct MergePolicy {
    mode: MergeMode,
    function: Option<MergeFn>,
}

impl MergePolicy {
    /// Creates a policy for the given mode without a merge function.
    pub fn new(mode: MergeMode) -> Self {
        Self {
            mode,
            function: None,
        }
    }

    /// Discards branch outputs.
    pub fn void() -> Self {
        Self::new(MergeMode::Void)
    }

    /// Passes the group's input through.
    pub fn piped_in() -> Self {
        Self::new(MergeMode::AsPipedIn)
    }

    /// Collects outputs as attributes keyed by branch.
    pub fn attributes() -> Self {
        Self::new(MergeMode::AsAttributes)
    }

    /// Deep-merges outputs.
    pub fn merged() -> Self {
        Self::new(MergeMode::AsMerged)
    }

    /// Merges outputs with `function`.
    pub fn function<F, Fut>(function: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Payload>> + Send + 'static,
    {
        Self::from_parts(MergeMode::AsMergeFunction, Some(merge_fn(function)))
    }

    /// Creates a policy from an already shared merge function.
    pub fn from_parts(mode: MergeMode, function: Option<MergeFn>) -> Self {
        Self { mode, function }
    }

    /// Returns the merge mode.
    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Returns `true` if a merge function is attached.
    pub fn has_function(&self) -> bool {
        self.function.is_some()
    }

    /// Reconciles branch outputs, given in declaration order.
    ///
    /// `keys` holds the attribute key of each branch, aligned with `outputs`.
    pub(crate) async fn merge(
        &self,
        input: Payload,
        keys: &[String],
        outputs: Vec<Payload>,
    ) -> Result<Payload> {
        match self.mode {
            MergeMode::Void => Ok(Payload::empty()),
            MergeMode::AsPipedIn => Ok(input),
            MergeMode::AsAttributes => {
                let attributes: Map<String, Value> = keys
                    .iter()
                    .zip(outputs)
                    .filter_map(|(key, output)| Some((key.clone(), output.into_value()?)))
                    .collect();

                if attributes.is_empty() {
                    return Ok(Payload::empty());
                }
                Ok(Payload::new(Value::Object(attributes)))
            }
            MergeMode::AsMerged => {
                let defined = defined_outputs(outputs);
                if defined.is_empty() {
                    return Ok(Payload::empty());
                }
                Ok(deep_merge(defined))
            }
            MergeMode::AsMergeFunction => {
                let function = self.function.as_ref().ok_or_else(missing_function)?;
                function(defined_outputs(outputs)).await
            }
        }
    }
}

impl From<MergeMode> for MergePolicy {
    fn from(mode: MergeMode) -> Self {
        Self::new(mode)
    }
}

impl fmt::Debug for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergePolicy")
            .field("mode", &self.mode)
            .field("has_function", &self.function.is_some())
            .finish()
    }
}

fn missing_function() -> Error {
    Error::configuration("merge mode is asMergeFunction but no merge function was supplied")
}

fn defined_outputs(outputs: Vec<Payload>) -> Vec<Value> {
    outputs.into_iter().filter_map(Payload::into_value).collect()
}

/// Derives one unique attribute key per branch, in declaration order.
///
/// A key not yet taken is used as is. A repeated key gets the smallest
/// suffix `_1`, `_2`, ... that does not clash with any key derived so far,
/// so an explicit key such as `Lint_1` is never overwritten.
pub(crate) fn attribute_keys<'a, I>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut taken: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<&str, usize> = HashMap::new();

    keys.into_iter()
        .map(|key| {
            let derived = if taken.contains(key) {
                let suffix = suffixes.entry(key).or_insert(0);
                loop {
                    *suffix += 1;
                    let candidate = format!("{key}_{suffix}");
                    if !taken.contains(&candidate) {
                        break candidate;
                    }
                }
            } else {
                key.to_owned()
            };
            taken.insert(derived.clone());
            derived
        })
        .collect()
}
