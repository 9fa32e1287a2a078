//! Deterministic `Clock` implementations for tests.

use std::sync::atomic::{AtomicI64, Ordering};

use catalog_core::clock::Clock;
use chrono::{DateTime, Duration, Utc};

/// A clock that always returns a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock that advances by a fixed step on every reading, so consecutive
/// events get strictly increasing timestamps.
#[derive(Debug)]
pub struct TickingClock {
    start: DateTime<Utc>,
    step_millis: i64,
    reads: AtomicI64,
}

impl TickingClock {
    /// Create a clock whose first reading is `start` and whose every
    /// subsequent reading advances by `step_millis`.
    #[must_use]
    pub fn new(start: DateTime<Utc>, step_millis: i64) -> Self {
        Self {
            start,
            step_millis,
            reads: AtomicI64::new(0),
        }
    }
}

impl Clock for TickingClock {
    fn now(&self) -> DateTime<Utc> {
        let reads = self.reads.fetch_add(1, Ordering::Relaxed);
        self.start + Duration::milliseconds(reads * self.step_millis)
    }
}
