//! Stock transforms for everyday pipelines.
//!
//! | name      | profile      | behavior                                        |
//! |-----------|--------------|-------------------------------------------------|
//! | `noop`    | Independent  | does nothing                                    |
//! | `log`     | PayloadOnly  | logs the passed-in message                      |
//! | `sleep`   | PayloadOnly  | waits the passed-in number of milliseconds      |
//! | `inspect` | In           | logs the payload                                |
//! | `require` | PayloadIn    | fails unless the payload has the passed-in keys |
//! | `emit`    | PayloadOut   | the passed-in value becomes the payload         |
//! | `wrap`    | InOut        | the payload becomes `{ "value": payload }`      |

use std::time::Duration;

use async_trait::async_trait;
use pipewright_core::BoxedError;
use serde_json::{Value, json};

use crate::TRACING_TARGET_STOCK;
use crate::registry::TransformRegistry;
use crate::transform::{In, InOut, Independent, PayloadIn, PayloadOnly, PayloadOut, Transform};

/// Errors raised by stock transforms.
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    /// The payload lacks required keys.
    #[error("payload is missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),
    /// The payload is not a JSON object.
    #[error("payload is not an object")]
    NotAnObject,
}

/// Registers every stock transform under its lowercase name.
pub fn register_all(registry: &mut TransformRegistry) {
    registry
        .register("noop", || Transform::independent(Noop))
        .register("log", || Transform::payload_only(Log))
        .register("sleep", || Transform::payload_only(Sleep))
        .register("inspect", || Transform::input(Inspect))
        .register("require", || Transform::payload_in(Require))
        .register("emit", || Transform::payload_out(Emit))
        .register("wrap", || Transform::in_out(Wrap));
}

/// Does nothing; the payload passes through.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

#[async_trait]
impl Independent for Noop {
    async fn run(&self) -> Result<(), BoxedError> {
        Ok(())
    }
}

/// Logs its passed-in message at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Log;

#[async_trait]
impl PayloadOnly for Log {
    type PassedIn = String;

    async fn run(&self, message: String) -> Result<(), BoxedError> {
        tracing::info!(target: TRACING_TARGET_STOCK, %message, "log");
        Ok(())
    }
}

/// Waits for the passed-in number of milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sleep;

#[async_trait]
impl PayloadOnly for Sleep {
    type PassedIn = u64;

    async fn run(&self, millis: u64) -> Result<(), BoxedError> {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(())
    }
}

/// Logs the payload at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inspect;

#[async_trait]
impl In for Inspect {
    type Input = Value;

    async fn run(&self, payload: Value) -> Result<(), BoxedError> {
        tracing::info!(target: TRACING_TARGET_STOCK, %payload, "inspect");
        Ok(())
    }
}

/// Fails unless the payload is an object holding every passed-in key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Require;

#[async_trait]
impl PayloadIn for Require {
    type PassedIn = Vec<String>;
    type Input = Value;

    async fn run(&self, payload: Value, keys: Vec<String>) -> Result<(), BoxedError> {
        let Value::Object(object) = payload else {
            return Err(StockError::NotAnObject.into());
        };

        let missing: Vec<String> = keys
            .into_iter()
            .filter(|key| !object.contains_key(key))
            .collect();
        if !missing.is_empty() {
            return Err(StockError::MissingKeys(missing).into());
        }
        Ok(())
    }
}

/// Replaces the payload with the passed-in value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Emit;

#[async_trait]
impl PayloadOut for Emit {
    type PassedIn = Value;
    type Output = Value;

    async fn run(&self, value: Value) -> Result<Value, BoxedError> {
        Ok(value)
    }
}

/// Wraps the payload as `{ "value": payload }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wrap;

#[async_trait]
impl InOut for Wrap {
    type Input = Value;
    type Output = Value;

    async fn run(&self, payload: Value) -> Result<Value, BoxedError> {
        Ok(json!({ "value": payload }))
    }
}
