//! Timing information for operations.
//!
//! This module provides the [`Timing`] struct for capturing start and end
//! timestamps, and [`TimingMarks`], a registry of active marks scoped to a
//! single pipeline. A [`TimingMark`] releases its key when dropped, so a mark
//! is cleared on every exit path of the stage it measures.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_TIMING;

/// Timing information for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// When the operation started.
    pub started_at: Timestamp,
    /// When the operation ended.
    pub ended_at: Timestamp,
}

impl Timing {
    /// Create a new timing with the given start and end timestamps.
    pub fn new(started_at: Timestamp, ended_at: Timestamp) -> Self {
        Self {
            started_at,
            ended_at,
        }
    }

    /// Get the duration of the operation.
    pub fn duration(&self) -> SignedDuration {
        self.ended_at.duration_since(self.started_at)
    }

    /// Returns the duration formatted for log output.
    pub fn elapsed(&self) -> String {
        format_duration(self.duration())
    }
}

/// Formats a duration as `"{n}ms"` below one second and `"{s.mmm}s"` above.
pub fn format_duration(duration: SignedDuration) -> String {
    let millis = duration.as_millis();
    if millis.abs() < 1000 {
        format!("{millis}ms")
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}

/// Registry of active timing marks.
///
/// Cloning yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct TimingMarks {
    active: Arc<Mutex<HashSet<String>>>,
}

impl TimingMarks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a mark for `key`.
    ///
    /// Returns `None` if a mark with the same key is already active. This is
    /// a caller bug and is logged, never raised.
    pub fn start(&self, key: impl Into<String>) -> Option<TimingMark> {
        let key = key.into();
        if !self.lock().insert(key.clone()) {
            tracing::warn!(
                target: TRACING_TARGET_TIMING,
                key = %key,
                "timing mark already active"
            );
            return None;
        }

        Some(TimingMark {
            key,
            started_at: Timestamp::now(),
            marks: self.clone(),
        })
    }

    /// Returns `true` if a mark with this key is currently active.
    pub fn is_active(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    /// Returns the number of active marks.
    pub fn active_count(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, key: &str) {
        self.lock().remove(key);
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An active timing mark; dropping it clears the key.
#[derive(Debug)]
pub struct TimingMark {
    key: String,
    started_at: Timestamp,
    marks: TimingMarks,
}

impl TimingMark {
    /// Returns the key this mark was started with.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Ends the mark and returns the measured timing.
    pub fn finish(self) -> Timing {
        Timing::new(self.started_at, Timestamp::now())
    }
}

impl Drop for TimingMark {
    fn drop(&mut self) {
        self.marks.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_creation() {
        let start = Timestamp::now();
        let end = start + SignedDuration::from_millis(100);

        let timing = Timing::new(start, end);

        assert_eq!(timing.started_at, start);
        assert_eq!(timing.ended_at, end);
        assert_eq!(timing.duration().as_millis(), 100);
        assert_eq!(timing.elapsed(), "100ms");
    }

    #[test]
    fn test_elapsed_above_one_second() {
        let start = Timestamp::now();
        let timing = Timing::new(start, start + SignedDuration::from_millis(2500));

        assert_eq!(timing.elapsed(), "2.500s");
    }

    #[test]
    fn test_duplicate_mark_is_rejected() {
        let marks = TimingMarks::new();

        let first = marks.start("Transform:build:Compile");
        assert!(first.is_some());
        assert!(marks.start("Transform:build:Compile").is_none());
        assert_eq!(marks.active_count(), 1);
    }

    #[test]
    fn test_mark_released_on_finish_and_drop() {
        let marks = TimingMarks::new();

        let mark = marks.start("finish").unwrap();
        assert!(marks.is_active("finish"));
        let _timing = mark.finish();
        assert!(!marks.is_active("finish"));

        {
            let _mark = marks.start("scoped").unwrap();
            assert!(marks.is_active("scoped"));
        }
        assert!(!marks.is_active("scoped"));
        assert!(marks.start("scoped").is_some());
    }
}
