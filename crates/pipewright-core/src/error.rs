//! Common error type definitions.
//!
//! Every failure surfaced by a pipeline is an [`Error`]. Foreign errors and
//! panics raised inside transforms are normalized into one exactly once, as
//! close to their origin as possible; an existing [`Error`] always passes
//! through unchanged.

use std::any::Any;
use std::fmt::Write as _;

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Transform implementations return this so they can use `?` on any error
/// type; the runtime normalizes it into an [`Error`].
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Message used when nothing readable can be recovered from a failure.
const UNKNOWN_ERROR: &str = "unknown error";

/// Categories of errors that can occur while assembling or executing a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// A single transform failed.
    Transform,
    /// One or more branches of a parallel group failed.
    Composite,
    /// Caller misuse detected at assembly or execute time.
    Configuration,
    /// A payload could not be converted to or from a transform's types.
    Serialization,
    /// A failure of unknown shape, such as a panic inside a transform.
    Unknown,
}

/// A structured error type for pipeline operations.
#[derive(Debug, Error)]
#[error("{}", render(*kind, transform.as_deref(), message.as_deref(), causes))]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Name of the transform the failure originated in, if any.
    pub transform: Option<String>,
    /// Underlying branch failures of a composite error, in declaration order.
    pub causes: Vec<Error>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            transform: None,
            causes: Vec::new(),
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Records the originating transform, keeping the innermost one.
    pub fn with_transform(mut self, transform: impl Into<String>) -> Self {
        if self.transform.is_none() {
            self.transform = Some(transform.into());
        }
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new transform failure.
    pub fn transform(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transform).with_transform(name)
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration).with_message(message)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a new unknown error.
    pub fn unknown() -> Self {
        Self::new(ErrorKind::Unknown).with_message(UNKNOWN_ERROR)
    }

    /// Aggregates branch failures into one composite error.
    ///
    /// The causes must already be in branch declaration order.
    pub fn composite(causes: Vec<Error>) -> Self {
        let mut error = Self::new(ErrorKind::Composite);
        error.causes = causes;
        error
    }

    /// Normalizes an arbitrary boxed error.
    ///
    /// An [`Error`] is returned unchanged. Anything else becomes a
    /// [`ErrorKind::Transform`] error carrying the original as its source.
    pub fn normalize(error: BoxedError) -> Self {
        match error.downcast::<Error>() {
            Ok(error) => *error,
            Err(other) => {
                let message = other.to_string();
                let mut error = Self::new(ErrorKind::Transform).with_message(message);
                error.source = Some(other);
                error
            }
        }
    }

    /// Normalizes the payload of a caught panic.
    ///
    /// Strings pass through, scalars are stringified and anything else is
    /// reported as an unknown error.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = panic_message(payload.as_ref()).unwrap_or_else(|| UNKNOWN_ERROR.to_owned());
        Self::new(ErrorKind::Unknown).with_message(message)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns the aggregated causes of a composite error.
    pub fn causes(&self) -> &[Error] {
        &self.causes
    }

    /// Returns `true` for caller-misuse errors.
    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }

    /// Returns `true` when one or more parallel branches failed.
    pub fn is_composite(&self) -> bool {
        self.kind == ErrorKind::Composite
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization()
            .with_message(error.to_string())
            .with_source(error)
    }
}

/// Best-effort message extraction from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        return Some((*message).to_owned());
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return Some(message.clone());
    }

    macro_rules! stringify_scalar {
        ($($ty:ty),*) => {
            $(
                if let Some(value) = payload.downcast_ref::<$ty>() {
                    return Some(value.to_string());
                }
            )*
        };
    }

    stringify_scalar!(
        i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char
    );

    None
}

fn render(
    kind: ErrorKind,
    transform: Option<&str>,
    message: Option<&str>,
    causes: &[Error],
) -> String {
    let mut out = String::new();
    match (kind, transform) {
        (ErrorKind::Composite, _) => {
            let _ = write!(out, "{} parallel branch(es) failed", causes.len());
        }
        (_, Some(transform)) => {
            let _ = write!(out, "transform `{transform}` failed");
        }
        (kind, None) => out.push_str(kind.as_ref()),
    }

    if let Some(message) = message {
        let _ = write!(out, ": {message}");
    }

    if !causes.is_empty() {
        let joined = causes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        let _ = write!(out, " [{joined}]");
    }

    out
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn normalize_passes_existing_error_through() {
        let original = Error::configuration("minimum length is 2");
        let normalized = Error::normalize(Box::new(original));

        assert_eq!(normalized.kind(), ErrorKind::Configuration);
        assert_eq!(normalized.message.as_deref(), Some("minimum length is 2"));
        assert!(normalized.source.is_none());
    }

    #[test]
    fn normalize_wraps_foreign_error() {
        let foreign = io::Error::new(io::ErrorKind::NotFound, "missing directory");
        let normalized = Error::normalize(Box::new(foreign));

        assert_eq!(normalized.kind(), ErrorKind::Transform);
        assert_eq!(normalized.message.as_deref(), Some("missing directory"));
        assert!(normalized.source.is_some());
    }

    #[test]
    fn panic_payloads_are_sniffed() {
        let from_str = Error::from_panic(Box::new("boom"));
        assert_eq!(from_str.message.as_deref(), Some("boom"));

        let from_string = Error::from_panic(Box::new(String::from("bang")));
        assert_eq!(from_string.message.as_deref(), Some("bang"));

        let from_number = Error::from_panic(Box::new(42_u64));
        assert_eq!(from_number.message.as_deref(), Some("42"));

        let from_bool = Error::from_panic(Box::new(true));
        assert_eq!(from_bool.message.as_deref(), Some("true"));

        let from_other = Error::from_panic(Box::new(vec![1, 2, 3]));
        assert_eq!(from_other.message.as_deref(), Some("unknown error"));
        assert_eq!(from_other.kind(), ErrorKind::Unknown);
    }

    #[test]
    fn composite_keeps_cause_order() {
        let error = Error::composite(vec![
            Error::transform("first").with_message("a"),
            Error::transform("second").with_message("b"),
        ]);

        assert!(error.is_composite());
        let names: Vec<_> = error
            .causes()
            .iter()
            .filter_map(|cause| cause.transform.as_deref())
            .collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(
            error.to_string(),
            "2 parallel branch(es) failed [transform `first` failed: a; transform `second` failed: b]"
        );
    }

    #[test]
    fn with_transform_keeps_innermost_name() {
        let error = Error::transform("inner").with_transform("outer");
        assert_eq!(error.transform.as_deref(), Some("inner"));
    }

    #[test]
    fn display_without_transform_uses_kind() {
        let error = Error::configuration("array lengths do not match");
        assert_eq!(error.to_string(), "configuration: array lengths do not match");
    }
}
