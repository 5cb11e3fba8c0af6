//! Process-wide connectivity monitor.
//!
//! Wraps the pure tally with a lock, a clock and logging. Shared through an
//! `Arc` by every guarded call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::resilience::{
    ConnectivityMetrics, ConnectivitySignal, ConnectivityTally, NetworkOrigin,
};
use crate::ports::Clock;

pub struct ConnectivityMonitor {
    clock: Arc<dyn Clock>,
    tally: Mutex<ConnectivityTally>,
}

impl ConnectivityMonitor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            tally: Mutex::new(ConnectivityTally::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConnectivityTally> {
        self.tally.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_success(&self) {
        let now = self.clock.now();
        self.lock().record_success(now);
    }

    pub fn record_timeout(&self) {
        let now = self.clock.now();
        let signal = self.lock().record_timeout(now);
        self.log_signal(signal);
    }

    pub fn record_network_error(&self, origin: NetworkOrigin) {
        let now = self.clock.now();
        let signal = self.lock().record_network_error(origin, now);
        if origin == NetworkOrigin::ThirdParty {
            tracing::debug!("Network error attributed to a third party, streak unchanged");
        }
        self.log_signal(signal);
    }

    pub fn record_auth_error(&self) {
        let now = self.clock.now();
        self.lock().record_auth_error(now);
        tracing::warn!("Upstream rejected credentials; check API keys");
    }

    pub fn metrics(&self) -> ConnectivityMetrics {
        self.lock().metrics()
    }

    pub fn is_healthy(&self) -> bool {
        let metrics = self.metrics();
        metrics.is_healthy && !metrics.emergency_stop
    }

    pub fn is_emergency_stopped(&self) -> bool {
        self.lock().is_emergency_stopped()
    }

    /// Idempotent.
    pub fn set_emergency_stop(&self, active: bool) {
        let mut tally = self.lock();
        if tally.is_emergency_stopped() != active {
            tally.set_emergency_stop(active);
            if active {
                tracing::error!("Emergency stop enabled manually");
            } else {
                tracing::info!("Emergency stop cleared");
            }
        }
    }

    /// Zeroes all counters and clears the emergency stop.
    pub fn reset(&self) {
        self.lock().reset();
        tracing::info!("Connectivity counters reset");
    }

    fn log_signal(&self, signal: ConnectivitySignal) {
        match signal {
            ConnectivitySignal::None => {}
            ConnectivitySignal::CriticalTimeouts { streak } => {
                tracing::error!(streak, "Critical connectivity issue: repeated timeouts");
            }
            ConnectivitySignal::EmergencyStopActivated { streak } => {
                tracing::error!(
                    streak,
                    "Emergency stop activated: outbound calls blocked until reset"
                );
            }
        }
    }
}
