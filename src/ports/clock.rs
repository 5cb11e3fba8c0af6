//! Clock port - Source of "now" for every time-dependent component.
//!
//! Circuit breakers, rate limiters, the connectivity monitor and the cache
//! envelope read time through this port so tests can drive time explicitly.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::domain::foundation::Timestamp;

/// Port for reading the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at the given instant.
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: AtomicI64::new(start.as_unix_millis()),
        }
    }

    /// Creates a clock frozen at a fixed, arbitrary instant.
    pub fn frozen() -> Self {
        Self::new(Timestamp::from_unix_millis(1_700_000_000_000))
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.millis
            .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_unix_millis(self.millis.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::frozen();
        let start = clock.now();
        clock.advance(Duration::from_secs(61));
        assert_eq!(clock.now().elapsed_since(&start), Duration::from_secs(61));
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(!b.is_before(&a));
    }
}
