//! The value flowing through a pipeline.
//!
//! A [`Payload`] is either a JSON value or empty. JSON `null` and "no value"
//! are the same empty payload: a transform returning `()` or `None` produces
//! an empty payload, and an empty payload decodes as `null` for transforms
//! that read it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::TRACING_TARGET_PAYLOAD;
use crate::error::Result;

/// Pipeline payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Option<Value>);

impl Payload {
    /// Creates an empty payload.
    #[inline]
    pub const fn empty() -> Self {
        Self(None)
    }

    /// Creates a payload from anything convertible to a JSON value.
    ///
    /// A `null` value yields the empty payload.
    pub fn new(value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Null => Self::empty(),
            value => Self(Some(value)),
        }
    }

    /// Serializes a typed value into a payload.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::new(serde_json::to_value(value)?))
    }

    /// Returns `true` if the payload carries no value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the carried value, if any.
    #[inline]
    pub fn as_value(&self) -> Option<&Value> {
        self.0.as_ref()
    }

    /// Consumes the payload, returning the carried value.
    #[inline]
    pub fn into_value(self) -> Option<Value> {
        self.0
    }

    /// Consumes the payload, decoding it into a typed value.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.0.unwrap_or(Value::Null))?)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<Option<Value>> for Payload {
    fn from(value: Option<Value>) -> Self {
        value.map(Self::new).unwrap_or_default()
    }
}

/// Decodes an owned, typed deep copy of the payload.
///
/// The returned value shares no substructure with `payload`, so a transform
/// may mutate it freely without the change being visible to the caller.
pub fn snapshot<T: DeserializeOwned>(payload: &Payload) -> Result<T> {
    let decoded = match payload.as_value() {
        Some(value) => T::deserialize(value)?,
        None => T::deserialize(Value::Null)?,
    };
    Ok(decoded)
}

/// Deep-merges the given outputs into a single object, in iteration order.
///
/// Objects merge key-wise and arrays index-wise, recursively. On conflict
/// the later output wins. A top-level array contributes its elements under
/// their decimal index; other top-level scalars have no keys to contribute
/// and are skipped.
pub fn deep_merge<I>(outputs: I) -> Payload
where
    I: IntoIterator<Item = Value>,
{
    let mut merged = Map::new();

    for output in outputs {
        match output {
            Value::Object(map) => {
                for (key, value) in map {
                    merge_entry(&mut merged, key, value);
                }
            }
            Value::Array(items) => {
                for (index, value) in items.into_iter().enumerate() {
                    merge_entry(&mut merged, index.to_string(), value);
                }
            }
            other => {
                tracing::debug!(
                    target: TRACING_TARGET_PAYLOAD,
                    value = %other,
                    "skipping scalar output in deep merge"
                );
            }
        }
    }

    Payload::new(Value::Object(merged))
}

fn merge_entry(target: &mut Map<String, Value>, key: String, value: Value) {
    match target.get_mut(&key) {
        Some(existing) => merge_value(existing, value),
        None => {
            target.insert(key, value);
        }
    }
}

fn merge_value(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                merge_entry(target, key, value);
            }
        }
        (Value::Array(target), Value::Array(source)) => {
            for (index, value) in source.into_iter().enumerate() {
                match target.get_mut(index) {
                    Some(existing) => merge_value(existing, value),
                    None => target.push(value),
                }
            }
        }
        (target, source) => *target = source,
    }
}
