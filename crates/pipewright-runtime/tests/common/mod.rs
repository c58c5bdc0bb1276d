//! Test transforms shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pipewright_runtime::prelude::*;
use serde_json::{Map, Value, json};

/// Shared invocation counter.
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Counts its invocations and optionally fails.
pub struct Counted {
    calls: Calls,
    failure: Option<&'static str>,
}

#[async_trait]
impl Independent for Counted {
    async fn run(&self) -> Result<(), BoxedError> {
        self.calls.hit();
        match self.failure {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }
}

/// A counted transform that succeeds.
pub fn counted(name: &str, calls: &Calls) -> Transform {
    Transform::independent(Counted {
        calls: calls.clone(),
        failure: None,
    })
    .with_name(name)
}

/// A counted transform that fails with `message`.
pub fn failing(name: &str, calls: &Calls, message: &'static str) -> Transform {
    Transform::independent(Counted {
        calls: calls.clone(),
        failure: Some(message),
    })
    .with_name(name)
}

/// Waits, then emits its passed-in value or fails.
pub struct Delayed {
    delay: Duration,
    calls: Calls,
    failure: Option<&'static str>,
}

#[async_trait]
impl PayloadOut for Delayed {
    type PassedIn = Value;
    type Output = Value;

    async fn run(&self, passed_in: Value) -> Result<Value, BoxedError> {
        tokio::time::sleep(self.delay).await;
        self.calls.hit();
        match self.failure {
            Some(message) => Err(message.into()),
            None => Ok(passed_in),
        }
    }
}

/// Emits its passed-in value after `delay_ms`.
pub fn delayed(delay_ms: u64, calls: &Calls) -> Transform {
    Transform::payload_out(Delayed {
        delay: Duration::from_millis(delay_ms),
        calls: calls.clone(),
        failure: None,
    })
}

/// Fails with `message` after `delay_ms`.
pub fn delayed_failure(delay_ms: u64, calls: &Calls, message: &'static str) -> Transform {
    Transform::payload_out(Delayed {
        delay: Duration::from_millis(delay_ms),
        calls: calls.clone(),
        failure: Some(message),
    })
}

/// Appends its label to a list payload.
pub struct Append(pub &'static str);

#[async_trait]
impl InOut for Append {
    type Input = Option<Vec<String>>;
    type Output = Vec<String>;

    async fn run(&self, payload: Self::Input) -> Result<Self::Output, BoxedError> {
        let mut list = payload.unwrap_or_default();
        list.push(self.0.to_owned());
        Ok(list)
    }
}

/// Mutates and empties its payload copy.
pub struct Vandal;

#[async_trait]
impl In for Vandal {
    type Input = Map<String, Value>;

    async fn run(&self, mut payload: Self::Input) -> Result<(), BoxedError> {
        payload.insert("vandalized".into(), json!(true));
        payload.clear();
        Ok(())
    }
}

/// Mutates its payload copy using the passed-in key.
pub struct KeyedVandal;

#[async_trait]
impl PayloadIn for KeyedVandal {
    type PassedIn = String;
    type Input = Map<String, Value>;

    async fn run(&self, mut payload: Self::Input, key: String) -> Result<(), BoxedError> {
        payload.remove(&key);
        Ok(())
    }
}

/// Panics when invoked.
pub struct Panicky;

#[async_trait]
impl Independent for Panicky {
    async fn run(&self) -> Result<(), BoxedError> {
        panic!("branch exploded");
    }
}
