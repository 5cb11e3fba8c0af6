//! Transport error taxonomy shared by every outbound adapter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Upstream services the booking backend talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dependency {
    /// WooCommerce REST API.
    Commerce,
    /// Serverless function fronting the product database.
    Functions,
    /// Direct Postgres connection to the product database.
    Database,
    /// CRM automation webhook.
    Crm,
}

impl Dependency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dependency::Commerce => "commerce",
            Dependency::Functions => "functions",
            Dependency::Database => "database",
            Dependency::Crm => "crm",
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who caused a network failure.
///
/// Adapters tag this explicitly; failures attributed to a third party (an
/// intercepting proxy, an injected client script) are counted but never
/// escalate to an emergency stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkOrigin {
    Dependency,
    ThirdParty,
}

/// Errors produced by a guarded outbound call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("network error calling {dependency}: {message}")]
    Network {
        dependency: Dependency,
        message: String,
        origin: NetworkOrigin,
    },

    #[error("{dependency} did not respond within {after:?}")]
    Timeout {
        dependency: Dependency,
        after: Duration,
    },

    #[error("{dependency} rejected the credentials (HTTP {status})")]
    Auth { dependency: Dependency, status: u16 },

    #[error("unexpected response shape from {dependency}: {message}")]
    Shape {
        dependency: Dependency,
        message: String,
    },

    #[error("{dependency} returned HTTP {status}: {body}")]
    Http {
        dependency: Dependency,
        status: u16,
        body: String,
    },

    #[error("circuit open for {dependency}")]
    CircuitOpen { dependency: Dependency },

    #[error("rate limit reached for {dependency}, retry after {retry_after:?}")]
    RateLimited {
        dependency: Dependency,
        retry_after: Duration,
    },

    #[error("emergency stop active: outbound calls are blocked until connectivity is reset")]
    EmergencyStop,
}

impl TransportError {
    pub fn network(dependency: Dependency, message: impl Into<String>) -> Self {
        TransportError::Network {
            dependency,
            message: message.into(),
            origin: NetworkOrigin::Dependency,
        }
    }

    pub fn shape(dependency: Dependency, message: impl Into<String>) -> Self {
        TransportError::Shape {
            dependency,
            message: message.into(),
        }
    }

    /// Maps a non-success HTTP status to the matching variant.
    pub fn from_status(dependency: Dependency, status: u16, body: impl Into<String>) -> Self {
        match status {
            401 | 403 => TransportError::Auth { dependency, status },
            _ => TransportError::Http {
                dependency,
                status,
                body: body.into(),
            },
        }
    }

    /// Upstream the error came from, if any.
    pub fn dependency(&self) -> Option<Dependency> {
        match self {
            TransportError::Network { dependency, .. }
            | TransportError::Timeout { dependency, .. }
            | TransportError::Auth { dependency, .. }
            | TransportError::Shape { dependency, .. }
            | TransportError::Http { dependency, .. }
            | TransportError::CircuitOpen { dependency }
            | TransportError::RateLimited { dependency, .. } => Some(*dependency),
            TransportError::EmergencyStop => None,
        }
    }

    /// Credentials problem rather than an outage.
    pub fn is_auth(&self) -> bool {
        matches!(self, TransportError::Auth { .. })
    }

    /// The call was refused locally and never reached the network.
    pub fn is_local_rejection(&self) -> bool {
        matches!(
            self,
            TransportError::CircuitOpen { .. }
                | TransportError::RateLimited { .. }
                | TransportError::EmergencyStop
        )
    }

    /// Network-level failure (connection or deadline).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            TransportError::Network { .. } | TransportError::Timeout { .. }
        )
    }

    /// Counts as a failure for the upstream's circuit breaker.
    ///
    /// Auth and client (4xx) errors do not: they say nothing about the
    /// upstream's health. Neither do third-party network failures.
    pub fn counts_against_breaker(&self) -> bool {
        match self {
            TransportError::Network { origin, .. } => *origin == NetworkOrigin::Dependency,
            TransportError::Timeout { .. } | TransportError::Shape { .. } => true,
            TransportError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Worth retrying later on the same upstream.
    ///
    /// Shape errors are not: the upstream answered, just not with what we need.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network { .. } | TransportError::Timeout { .. } => true,
            TransportError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_and_403_are_auth_errors() {
        assert!(TransportError::from_status(Dependency::Commerce, 401, "").is_auth());
        assert!(TransportError::from_status(Dependency::Commerce, 403, "").is_auth());
        assert!(!TransportError::from_status(Dependency::Commerce, 500, "").is_auth());
    }

    #[test]
    fn auth_errors_never_count_against_breaker() {
        let err = TransportError::Auth {
            dependency: Dependency::Commerce,
            status: 401,
        };
        assert!(!err.counts_against_breaker());
        assert!(!err.is_retryable());
    }

    #[test]
    fn shape_errors_trip_breaker_but_are_not_retryable() {
        let err = TransportError::shape(Dependency::Functions, "expected array");
        assert!(err.counts_against_breaker());
        assert!(!err.is_retryable());
    }

    #[test]
    fn client_errors_are_neutral() {
        let err = TransportError::from_status(Dependency::Commerce, 404, "missing");
        assert!(!err.counts_against_breaker());
        assert!(!err.is_retryable());
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = TransportError::from_status(Dependency::Commerce, 503, "down");
        assert!(err.counts_against_breaker());
        assert!(err.is_retryable());
    }

    #[test]
    fn local_rejections_are_flagged() {
        assert!(TransportError::EmergencyStop.is_local_rejection());
        assert!(TransportError::CircuitOpen {
            dependency: Dependency::Database
        }
        .is_local_rejection());
        assert!(!TransportError::network(Dependency::Database, "reset").is_local_rejection());
    }

    #[test]
    fn third_party_network_errors_spare_the_breaker() {
        let err = TransportError::Network {
            dependency: Dependency::Commerce,
            message: "blocked by injected script".to_string(),
            origin: NetworkOrigin::ThirdParty,
        };
        assert!(err.is_transport());
        assert!(!err.counts_against_breaker());
        assert!(TransportError::network(Dependency::Commerce, "reset").counts_against_breaker());
    }

    #[test]
    fn dependency_is_reported() {
        let err = TransportError::Timeout {
            dependency: Dependency::Crm,
            after: Duration::from_secs(5),
        };
        assert_eq!(err.dependency(), Some(Dependency::Crm));
        assert_eq!(TransportError::EmergencyStop.dependency(), None);
    }
}
