//! Prelude module for convenient imports.
//!
//! ```rust
//! use pipewright_runtime::prelude::*;
//! ```

pub use pipewright_core::prelude::*;

pub use crate::definition::{PipelineDefinition, StageDefinition, TransformRef};
pub use crate::executor::{MergeMode, MergePolicy};
pub use crate::pipeline::{Overrides, Pipeline, PipelineBuilder, PipelineConfig};
pub use crate::registry::TransformRegistry;
pub use crate::transform::{
    In, InOut, Independent, PayloadIn, PayloadOnly, PayloadOut, Profile, Transform,
};
