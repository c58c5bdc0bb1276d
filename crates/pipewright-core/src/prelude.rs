//! Convenient re-exports for common use.

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::payload::Payload;
pub use crate::timing::{Timing, TimingMarks};
