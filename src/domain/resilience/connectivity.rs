//! Connectivity tally - process-wide view of outbound request health.
//!
//! Pure state: callers pass `now` in and act on the returned signal.

use serde::Serialize;

use crate::domain::foundation::Timestamp;

use super::NetworkOrigin;

/// Consecutive transport errors that mark connectivity as critical.
pub const CONSECUTIVE_ERROR_LIMIT: u32 = 3;

/// Success rate (percent) above which connectivity counts as healthy.
pub const HEALTHY_SUCCESS_RATE: f64 = 80.0;

/// Noteworthy transitions produced while recording an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivitySignal {
    None,
    /// Timeout streak reached the limit. Logged, not fatal.
    CriticalTimeouts { streak: u32 },
    /// Network error streak reached the limit; outbound calls must stop.
    EmergencyStopActivated { streak: u32 },
}

/// Running counters of request outcomes.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityTally {
    total_requests: u64,
    successful_requests: u64,
    timeouts: u64,
    network_errors: u64,
    auth_errors: u64,
    last_success: Option<Timestamp>,
    last_error: Option<Timestamp>,
    consecutive_errors: u32,
    emergency_stop: bool,
}

/// Snapshot of the tally with derived health figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectivityMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub timeouts: u64,
    pub network_errors: u64,
    pub auth_errors: u64,
    pub last_success: Option<Timestamp>,
    pub last_error: Option<Timestamp>,
    pub consecutive_errors: u32,
    pub success_rate: f64,
    pub is_healthy: bool,
    pub emergency_stop: bool,
}

impl ConnectivityTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, now: Timestamp) {
        self.total_requests += 1;
        self.successful_requests += 1;
        self.consecutive_errors = 0;
        self.last_success = Some(now);
    }

    pub fn record_timeout(&mut self, now: Timestamp) -> ConnectivitySignal {
        self.total_requests += 1;
        self.timeouts += 1;
        self.consecutive_errors += 1;
        self.last_error = Some(now);

        if self.consecutive_errors >= CONSECUTIVE_ERROR_LIMIT {
            ConnectivitySignal::CriticalTimeouts {
                streak: self.consecutive_errors,
            }
        } else {
            ConnectivitySignal::None
        }
    }

    pub fn record_network_error(
        &mut self,
        origin: NetworkOrigin,
        now: Timestamp,
    ) -> ConnectivitySignal {
        self.total_requests += 1;
        self.network_errors += 1;
        self.last_error = Some(now);

        if origin == NetworkOrigin::ThirdParty {
            return ConnectivitySignal::None;
        }

        self.consecutive_errors += 1;
        if self.consecutive_errors >= CONSECUTIVE_ERROR_LIMIT && !self.emergency_stop {
            self.emergency_stop = true;
            return ConnectivitySignal::EmergencyStopActivated {
                streak: self.consecutive_errors,
            };
        }
        ConnectivitySignal::None
    }

    /// Auth failures are configuration problems: the streak is left alone.
    pub fn record_auth_error(&mut self, now: Timestamp) {
        self.total_requests += 1;
        self.auth_errors += 1;
        self.last_error = Some(now);
    }

    pub fn is_emergency_stopped(&self) -> bool {
        self.emergency_stop
    }

    pub fn set_emergency_stop(&mut self, active: bool) {
        self.emergency_stop = active;
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn metrics(&self) -> ConnectivityMetrics {
        let success_rate = if self.total_requests == 0 {
            100.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64 * 100.0
        };

        ConnectivityMetrics {
            total_requests: self.total_requests,
            successful_requests: self.successful_requests,
            timeouts: self.timeouts,
            network_errors: self.network_errors,
            auth_errors: self.auth_errors,
            last_success: self.last_success,
            last_error: self.last_error,
            consecutive_errors: self.consecutive_errors,
            success_rate,
            is_healthy: success_rate > HEALTHY_SUCCESS_RATE
                && self.consecutive_errors < CONSECUTIVE_ERROR_LIMIT,
            emergency_stop: self.emergency_stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn now() -> Timestamp {
        Timestamp::from_unix_millis(1_700_000_000_000)
    }

    #[test]
    fn empty_tally_is_healthy_with_full_success_rate() {
        let metrics = ConnectivityTally::new().metrics();
        assert_eq!(metrics.success_rate, 100.0);
        assert!(metrics.is_healthy);
        assert_eq!(metrics.total_requests, 0);
    }

    #[test]
    fn success_clears_streak_and_stamps_time() {
        let mut tally = ConnectivityTally::new();
        tally.record_timeout(now());
        tally.record_timeout(now());
        tally.record_success(now());

        let metrics = tally.metrics();
        assert_eq!(metrics.consecutive_errors, 0);
        assert_eq!(metrics.last_success, Some(now()));
        assert_eq!(metrics.total_requests, 3);
        assert_eq!(metrics.successful_requests, 1);
    }

    #[test]
    fn third_timeout_signals_critical_without_emergency_stop() {
        let mut tally = ConnectivityTally::new();
        assert_eq!(tally.record_timeout(now()), ConnectivitySignal::None);
        assert_eq!(tally.record_timeout(now()), ConnectivitySignal::None);
        assert_eq!(
            tally.record_timeout(now()),
            ConnectivitySignal::CriticalTimeouts { streak: 3 }
        );
        assert!(!tally.is_emergency_stopped());
    }

    #[test]
    fn third_network_error_activates_emergency_stop_once() {
        let mut tally = ConnectivityTally::new();
        tally.record_network_error(NetworkOrigin::Dependency, now());
        tally.record_network_error(NetworkOrigin::Dependency, now());
        assert_eq!(
            tally.record_network_error(NetworkOrigin::Dependency, now()),
            ConnectivitySignal::EmergencyStopActivated { streak: 3 }
        );
        assert!(tally.is_emergency_stopped());
        assert_eq!(
            tally.record_network_error(NetworkOrigin::Dependency, now()),
            ConnectivitySignal::None
        );
    }

    #[test]
    fn third_party_errors_are_counted_but_never_stop() {
        let mut tally = ConnectivityTally::new();
        for _ in 0..10 {
            tally.record_network_error(NetworkOrigin::ThirdParty, now());
        }
        let metrics = tally.metrics();
        assert_eq!(metrics.network_errors, 10);
        assert_eq!(metrics.consecutive_errors, 0);
        assert!(!metrics.emergency_stop);
    }

    #[test]
    fn health_requires_rate_above_eighty_percent() {
        let mut tally = ConnectivityTally::new();
        for _ in 0..4 {
            tally.record_success(now());
        }
        tally.record_auth_error(now());
        // 4 of 5 = 80%, not strictly above.
        assert!(!tally.metrics().is_healthy);
        tally.record_success(now());
        assert!(tally.metrics().is_healthy);
    }

    #[test]
    fn reset_clears_everything() {
        let mut tally = ConnectivityTally::new();
        for _ in 0..3 {
            tally.record_network_error(NetworkOrigin::Dependency, now());
        }
        tally.reset();
        let metrics = tally.metrics();
        assert_eq!(metrics.total_requests, 0);
        assert!(!metrics.emergency_stop);
        assert_eq!(metrics.consecutive_errors, 0);
    }

    #[derive(Debug, Clone)]
    enum Outcome {
        Success,
        Timeout,
        Network,
        ThirdParty,
        Auth,
    }

    fn outcome() -> impl Strategy<Value = Outcome> {
        prop_oneof![
            Just(Outcome::Success),
            Just(Outcome::Timeout),
            Just(Outcome::Network),
            Just(Outcome::ThirdParty),
            Just(Outcome::Auth),
        ]
    }

    fn apply(tally: &mut ConnectivityTally, outcome: &Outcome) {
        match outcome {
            Outcome::Success => tally.record_success(now()),
            Outcome::Timeout => {
                tally.record_timeout(now());
            }
            Outcome::Network => {
                tally.record_network_error(NetworkOrigin::Dependency, now());
            }
            Outcome::ThirdParty => {
                tally.record_network_error(NetworkOrigin::ThirdParty, now());
            }
            Outcome::Auth => tally.record_auth_error(now()),
        }
    }

    proptest! {
        #[test]
        fn auth_error_never_changes_streak(history in prop::collection::vec(outcome(), 0..40)) {
            let mut tally = ConnectivityTally::new();
            for o in &history {
                apply(&mut tally, o);
            }
            let before = tally.consecutive_errors();
            tally.record_auth_error(now());
            prop_assert_eq!(tally.consecutive_errors(), before);
        }

        #[test]
        fn successful_never_exceeds_total(history in prop::collection::vec(outcome(), 0..60)) {
            let mut tally = ConnectivityTally::new();
            for o in &history {
                apply(&mut tally, o);
            }
            let metrics = tally.metrics();
            prop_assert!(metrics.successful_requests <= metrics.total_requests);
            prop_assert_eq!(metrics.total_requests, history.len() as u64);
        }
    }
}
