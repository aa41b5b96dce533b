//! Time source abstraction
//!
//! The detection core only needs a monotonic millisecond clock: poll
//! stagger, tracking cadence, and track staleness are all computed from
//! `now()` deltas. Firmware supplies a tick-counter implementation; host
//! builds get [`SystemTime`]; tests drive [`FixedTime`] by hand.

/// Timestamp in milliseconds since device boot (monotonic).
pub type Timestamp = u64;

/// Source of monotonic time for the pipeline.
pub trait TimeSource {
    /// Get the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// System clock source (requires `std`).
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Fixed time source for testing.
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Create a source pinned at the given timestamp.
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute timestamp.
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance by the given number of milliseconds.
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let mut time = FixedTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);

        time.set(10_000);
        assert_eq!(time.now(), 10_000);
    }
}
