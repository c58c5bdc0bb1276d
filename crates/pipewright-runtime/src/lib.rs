#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod context;
pub mod definition;
pub mod executor;
pub mod pipeline;
pub mod registry;
pub mod stock;
pub mod transform;

#[doc(hidden)]
pub mod prelude;

pub use pipewright_core::{Error, ErrorKind, Payload, Result};

/// Tracing target for pipeline execution.
pub const TRACING_TARGET_PIPELINE: &str = "pipewright_runtime::pipeline";

/// Tracing target for registry and definition compilation.
pub const TRACING_TARGET_REGISTRY: &str = "pipewright_runtime::registry";

/// Tracing target for stock transforms.
pub const TRACING_TARGET_STOCK: &str = "pipewright_runtime::stock";
