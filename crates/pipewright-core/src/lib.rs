#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for payload operations.
pub const TRACING_TARGET_PAYLOAD: &str = "pipewright_core::payload";

/// Tracing target for timing marks.
pub const TRACING_TARGET_TIMING: &str = "pipewright_core::timing";

mod error;
mod payload;
mod timing;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use payload::{Payload, deep_merge, snapshot};
pub use timing::{Timing, TimingMark, TimingMarks, format_duration};
