//! Type-erased, payload-level views of the capability traits.
//!
//! Each view carries the narrow signature of its profile. Decoding of
//! inputs, encoding of outputs and error normalization happen here, so the
//! dispatcher in [`Transform`](super::Transform) only deals in payloads.

use async_trait::async_trait;
use pipewright_core::{Error, Payload, Result, snapshot};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::capability::{In, InOut, Independent, PayloadIn, PayloadOnly, PayloadOut};

fn decode_passed_in<T: DeserializeOwned>(passed_in: Option<&Value>) -> Result<T> {
    let decoded = match passed_in {
        Some(value) => <T as Deserialize>::deserialize(value)?,
        None => <T as Deserialize>::deserialize(Value::Null)?,
    };
    Ok(decoded)
}

#[async_trait]
pub(crate) trait ErasedIndependent: Send + Sync {
    async fn call(&self) -> Result<()>;
}

#[async_trait]
impl<T: Independent> ErasedIndependent for T {
    async fn call(&self) -> Result<()> {
        Independent::run(self).await.map_err(Error::normalize)
    }
}

#[async_trait]
pub(crate) trait ErasedPayloadOnly: Send + Sync {
    async fn call(&self, passed_in: Option<&Value>) -> Result<()>;
}

#[async_trait]
impl<T: PayloadOnly> ErasedPayloadOnly for T {
    async fn call(&self, passed_in: Option<&Value>) -> Result<()> {
        let passed_in = decode_passed_in::<T::PassedIn>(passed_in)?;
        PayloadOnly::run(self, passed_in)
            .await
            .map_err(Error::normalize)
    }
}

#[async_trait]
pub(crate) trait ErasedIn: Send + Sync {
    async fn call(&self, payload: &Payload) -> Result<()>;
}

#[async_trait]
impl<T: In> ErasedIn for T {
    async fn call(&self, payload: &Payload) -> Result<()> {
        let copy = snapshot::<T::Input>(payload)?;
        In::run(self, copy).await.map_err(Error::normalize)
    }
}

#[async_trait]
pub(crate) trait ErasedInOut: Send + Sync {
    async fn call(&self, payload: Payload) -> Result<Payload>;
}

#[async_trait]
impl<T: InOut> ErasedInOut for T {
    async fn call(&self, payload: Payload) -> Result<Payload> {
        let input = payload.decode::<T::Input>()?;
        let output = InOut::run(self, input).await.map_err(Error::normalize)?;
        Payload::encode(&output)
    }
}

#[async_trait]
pub(crate) trait ErasedPayloadIn: Send + Sync {
    async fn call(&self, payload: &Payload, passed_in: Option<&Value>) -> Result<()>;
}

#[async_trait]
impl<T: PayloadIn> ErasedPayloadIn for T {
    async fn call(&self, payload: &Payload, passed_in: Option<&Value>) -> Result<()> {
        let copy = snapshot::<T::Input>(payload)?;
        let passed_in = decode_passed_in::<T::PassedIn>(passed_in)?;
        PayloadIn::run(self, copy, passed_in)
            .await
            .map_err(Error::normalize)
    }
}

#[async_trait]
pub(crate) trait ErasedPayloadOut: Send + Sync {
    async fn call(&self, passed_in: Option<&Value>) -> Result<Payload>;
}

#[async_trait]
impl<T: PayloadOut> ErasedPayloadOut for T {
    async fn call(&self, passed_in: Option<&Value>) -> Result<Payload> {
        let passed_in = decode_passed_in::<T::PassedIn>(passed_in)?;
        let output = PayloadOut::run(self, passed_in)
            .await
            .map_err(Error::normalize)?;
        Payload::encode(&output)
    }
}
