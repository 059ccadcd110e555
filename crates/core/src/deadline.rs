//! Request deadlines.

use std::time::{Duration, Instant};

/// Point in time by which an operation must have completed.
///
/// Adapters resolve the configured backend timeout into a `Deadline` once per
/// request; the engine only compares against it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    pub fn instant(&self) -> Instant {
        self.0
    }

    pub fn has_elapsed(&self) -> bool {
        Instant::now() >= self.0
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }
}
