//! Raw timing samples.

use std::time::{Duration, Instant};

/// A single recorded measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    start: Instant,
    end: Instant,
}

impl Sample {
    /// Create a sample from its start and end instants.
    #[must_use]
    pub const fn new(start: Instant, end: Instant) -> Self {
        Self { start, end }
    }

    /// Create a sample of the given length starting now.
    #[must_use]
    pub fn from_duration(duration: Duration) -> Self {
        let start = Instant::now();
        let end = start.checked_add(duration).unwrap_or(start);
        Self { start, end }
    }

    /// Instant the measurement started.
    #[must_use]
    pub const fn start(&self) -> Instant {
        self.start
    }

    /// Instant the measurement ended.
    #[must_use]
    pub const fn end(&self) -> Instant {
        self.end
    }

    /// Measured length; zero if the end precedes the start.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }
}
