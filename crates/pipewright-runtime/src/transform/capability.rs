//! One trait per capability profile.
//!
//! Each trait exposes exactly the inputs its profile consumes. Inputs and
//! outputs are typed; the runtime converts them from and to the flowing
//! [`Payload`](pipewright_core::Payload) through serde, so an implementation
//! never sees the inputs its profile does not declare.

use async_trait::async_trait;
use pipewright_core::BoxedError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Returns the unqualified name of `T`, without generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A pure side effect: reads neither the passed-in value nor the payload.
#[async_trait]
pub trait Independent: Send + Sync + 'static {
    /// Name used in logs, timing keys and default attribute keys.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Performs the side effect.
    async fn run(&self) -> Result<(), BoxedError>;
}

/// Reads only the passed-in value.
#[async_trait]
pub trait PayloadOnly: Send + Sync + 'static {
    /// Type of the value supplied at assembly time.
    type PassedIn: DeserializeOwned + Send;

    /// Name used in logs, timing keys and default attribute keys.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Consumes the passed-in value.
    async fn run(&self, passed_in: Self::PassedIn) -> Result<(), BoxedError>;
}

/// Observes a private copy of the payload without altering it.
#[async_trait]
pub trait In: Send + Sync + 'static {
    /// Type the payload is decoded into.
    type Input: DeserializeOwned + Send;

    /// Name used in logs, timing keys and default attribute keys.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Inspects the payload copy.
    async fn run(&self, payload: Self::Input) -> Result<(), BoxedError>;
}

/// Reads the payload and produces the next one.
#[async_trait]
pub trait InOut: Send + Sync + 'static {
    /// Type the payload is decoded into.
    type Input: DeserializeOwned + Send;
    /// Type of the produced payload.
    type Output: Serialize + Send;

    /// Name used in logs, timing keys and default attribute keys.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Produces the next payload.
    async fn run(&self, payload: Self::Input) -> Result<Self::Output, BoxedError>;
}

/// Reads the passed-in value and a private copy of the payload.
#[async_trait]
pub trait PayloadIn: Send + Sync + 'static {
    /// Type of the value supplied at assembly time.
    type PassedIn: DeserializeOwned + Send;
    /// Type the payload is decoded into.
    type Input: DeserializeOwned + Send;

    /// Name used in logs, timing keys and default attribute keys.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Inspects the payload copy together with the passed-in value.
    async fn run(&self, payload: Self::Input, passed_in: Self::PassedIn) -> Result<(), BoxedError>;
}

/// Produces a new payload from the passed-in value alone.
#[async_trait]
pub trait PayloadOut: Send + Sync + 'static {
    /// Type of the value supplied at assembly time.
    type PassedIn: DeserializeOwned + Send;
    /// Type of the produced payload.
    type Output: Serialize + Send;

    /// Name used in logs, timing keys and default attribute keys.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Produces the next payload.
    async fn run(&self, passed_in: Self::PassedIn) -> Result<Self::Output, BoxedError>;
}
