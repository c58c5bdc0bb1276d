//! Capability profiles.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Which inputs a transform reads and whether it produces a new payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Profile {
    /// Reads nothing, leaves the payload unchanged.
    Independent,
    /// Reads the passed-in value, leaves the payload unchanged.
    PayloadOnly,
    /// Reads a copy of the payload, leaves the payload unchanged.
    In,
    /// Reads the payload and produces a new one.
    InOut,
    /// Reads the passed-in value and a copy of the payload, leaves the payload unchanged.
    PayloadIn,
    /// Reads the passed-in value and produces a new payload.
    PayloadOut,
}

impl Profile {
    /// Returns `true` if the transform consumes its passed-in value.
    pub const fn reads_passed_in(self) -> bool {
        matches!(self, Self::PayloadOnly | Self::PayloadIn | Self::PayloadOut)
    }

    /// Returns `true` if the transform consumes the pipeline payload.
    pub const fn reads_payload(self) -> bool {
        matches!(self, Self::In | Self::InOut | Self::PayloadIn)
    }

    /// Returns `true` if the transform replaces the pipeline payload.
    pub const fn produces_payload(self) -> bool {
        matches!(self, Self::InOut | Self::PayloadOut)
    }

    /// Returns `true` if the implementation receives a private copy of the payload.
    pub const fn copies_payload(self) -> bool {
        self.reads_payload() && !self.produces_payload()
    }
}
