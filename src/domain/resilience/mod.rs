//! Resilience vocabulary: upstream identifiers, the transport error taxonomy
//! and the connectivity tally that drives the emergency stop.

mod connectivity;
mod transport_error;

pub use connectivity::{
    ConnectivityMetrics, ConnectivitySignal, ConnectivityTally, CONSECUTIVE_ERROR_LIMIT,
    HEALTHY_SUCCESS_RATE,
};
pub use transport_error::{Dependency, NetworkOrigin, TransportError};
