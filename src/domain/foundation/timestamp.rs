//! Timestamp value object for immutable points in time.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable point in time, always UTC, millisecond precision for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Out-of-range values clamp to the Unix epoch.
    pub fn from_unix_millis(millis: i64) -> Self {
        Self(
            Utc.timestamp_millis_opt(millis)
                .single()
                .unwrap_or_default(),
        )
    }

    /// Returns the timestamp as Unix milliseconds.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Returns a new timestamp shifted forward by `duration`.
    pub fn plus(&self, duration: Duration) -> Self {
        let delta = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        Self(self.0 + delta)
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is in the future.
    pub fn elapsed_since(&self, earlier: &Timestamp) -> Duration {
        self.0
            .signed_duration_since(earlier.0)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn unix_millis_roundtrip() {
        let ts = Timestamp::from_unix_millis(1_705_276_800_123);
        assert_eq!(ts.as_unix_millis(), 1_705_276_800_123);
        assert_eq!(ts.as_datetime().year(), 2024);
    }

    #[test]
    fn plus_and_elapsed_since_agree() {
        let start = Timestamp::from_unix_millis(1_000);
        let later = start.plus(Duration::from_secs(90));
        assert_eq!(later.as_unix_millis(), 91_000);
        assert_eq!(later.elapsed_since(&start), Duration::from_secs(90));
        assert!(start.is_before(&later));
    }

    #[test]
    fn elapsed_since_future_is_zero() {
        let start = Timestamp::from_unix_millis(5_000);
        let earlier = Timestamp::from_unix_millis(1_000);
        assert_eq!(earlier.elapsed_since(&start), Duration::ZERO);
    }

    #[test]
    fn timestamp_serializes_to_json() {
        let ts = Timestamp::from_unix_millis(1_705_314_600_000);
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15"));
    }
}
