//! Transforms: the smallest unit of work in a pipeline.
//!
//! A transform implements one of the six capability traits
//! ([`Independent`], [`PayloadOnly`], [`In`], [`InOut`], [`PayloadIn`],
//! [`PayloadOut`]) and is wrapped into a [`Transform`], which records its
//! [`Profile`] and is what executors own and invoke.

mod capability;
mod erased;
mod profile;

use std::fmt;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use pipewright_core::{Error, Payload, Result};
use serde_json::Value;

pub use self::capability::{In, InOut, Independent, PayloadIn, PayloadOnly, PayloadOut};
use self::erased::{
    ErasedIn, ErasedInOut, ErasedIndependent, ErasedPayloadIn, ErasedPayloadOnly,
    ErasedPayloadOut,
};
pub use self::profile::Profile;
use crate::context::ExecutionContext;

/// Tracing target for transform invocations.
const TRACING_TARGET: &str = "pipewright_runtime::transform";

/// The narrow implementation behind a transform, tagged by profile.
enum Capability {
    Independent(Box<dyn ErasedIndependent>),
    PayloadOnly(Box<dyn ErasedPayloadOnly>),
    In(Box<dyn ErasedIn>),
    InOut(Box<dyn ErasedInOut>),
    PayloadIn(Box<dyn ErasedPayloadIn>),
    PayloadOut(Box<dyn ErasedPayloadOut>),
}

/// A transform instance, owned by the execution node it was added to.
pub struct Transform {
    name: String,
    capability: Capability,
}

impl Transform {
    /// Wraps a transform that reads nothing.
    pub fn independent<T: Independent>(transform: T) -> Self {
        Self::from_parts(
            Independent::name(&transform),
            Capability::Independent(Box::new(transform)),
        )
    }

    /// Wraps a transform that reads only its passed-in value.
    pub fn payload_only<T: PayloadOnly>(transform: T) -> Self {
        Self::from_parts(
            PayloadOnly::name(&transform),
            Capability::PayloadOnly(Box::new(transform)),
        )
    }

    /// Wraps a transform that observes a copy of the payload.
    pub fn input<T: In>(transform: T) -> Self {
        Self::from_parts(In::name(&transform), Capability::In(Box::new(transform)))
    }

    /// Wraps a transform that produces a new payload from the current one.
    pub fn in_out<T: InOut>(transform: T) -> Self {
        Self::from_parts(
            InOut::name(&transform),
            Capability::InOut(Box::new(transform)),
        )
    }

    /// Wraps a transform that observes a copy of the payload and its passed-in value.
    pub fn payload_in<T: PayloadIn>(transform: T) -> Self {
        Self::from_parts(
            PayloadIn::name(&transform),
            Capability::PayloadIn(Box::new(transform)),
        )
    }

    /// Wraps a transform that produces a new payload from its passed-in value.
    pub fn payload_out<T: PayloadOut>(transform: T) -> Self {
        Self::from_parts(
            PayloadOut::name(&transform),
            Capability::PayloadOut(Box::new(transform)),
        )
    }

    fn from_parts(name: &str, capability: Capability) -> Self {
        Self {
            name: name.to_owned(),
            capability,
        }
    }

    /// Overrides the name used in logs and as default attribute key.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the transform name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the capability profile.
    pub fn profile(&self) -> Profile {
        match self.capability {
            Capability::Independent(_) => Profile::Independent,
            Capability::PayloadOnly(_) => Profile::PayloadOnly,
            Capability::In(_) => Profile::In,
            Capability::InOut(_) => Profile::InOut,
            Capability::PayloadIn(_) => Profile::PayloadIn,
            Capability::PayloadOut(_) => Profile::PayloadOut,
        }
    }

    /// Invokes the transform.
    ///
    /// Inputs the profile does not consume are discarded. Profiles that do
    /// not produce a payload return `payload` itself. Failures, including
    /// panics, come back as an [`Error`] tagged with this transform's name.
    pub async fn execute(
        &self,
        payload: Payload,
        passed_in: Option<&Value>,
        ctx: &ExecutionContext,
    ) -> Result<Payload> {
        let profile = self.profile();
        tracing::debug!(
            target: TRACING_TARGET,
            transform = %self.name,
            %profile,
            path = ctx.path(),
            depth = ctx.depth(),
            "transform starting"
        );

        let mark = ctx.start_mark(&format!("Transform:{}", self.name));
        let result = AssertUnwindSafe(self.dispatch(payload, passed_in))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(Error::from_panic(panic)))
            .map_err(|error| error.with_transform(self.name.as_str()));
        let elapsed = mark.map(|mark| mark.finish().elapsed());

        match &result {
            Ok(_) => tracing::debug!(
                target: TRACING_TARGET,
                transform = %self.name,
                path = ctx.path(),
                depth = ctx.depth(),
                elapsed = elapsed.as_deref().unwrap_or_default(),
                "transform completed"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                transform = %self.name,
                path = ctx.path(),
                depth = ctx.depth(),
                elapsed = elapsed.as_deref().unwrap_or_default(),
                error = %error,
                "transform failed"
            ),
        }

        result
    }

    async fn dispatch(&self, payload: Payload, passed_in: Option<&Value>) -> Result<Payload> {
        match &self.capability {
            Capability::Independent(inner) => {
                inner.call().await?;
                Ok(payload)
            }
            Capability::PayloadOnly(inner) => {
                inner.call(passed_in).await?;
                Ok(payload)
            }
            Capability::In(inner) => {
                inner.call(&payload).await?;
                Ok(payload)
            }
            Capability::InOut(inner) => inner.call(payload).await,
            Capability::PayloadIn(inner) => {
                inner.call(&payload, passed_in).await?;
                Ok(payload)
            }
            Capability::PayloadOut(inner) => inner.call(passed_in).await,
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("name", &self.name)
            .field("profile", &self.profile())
            .finish()
    }
}
