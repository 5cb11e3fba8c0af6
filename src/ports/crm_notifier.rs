//! CRM notifier port - fire-and-forget reservation webhook.

use async_trait::async_trait;

use crate::domain::checkout::CrmPayload;
use crate::domain::resilience::TransportError;

/// Port for telling the CRM about a submitted reservation.
///
/// Only the HTTP status is checked; no response body is relied upon.
#[async_trait]
pub trait CrmNotifier: Send + Sync {
    async fn notify(&self, payload: &CrmPayload) -> Result<(), TransportError>;
}
