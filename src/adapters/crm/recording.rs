//! CRM notifier doubles.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::checkout::CrmPayload;
use crate::domain::resilience::TransportError;
use crate::ports::CrmNotifier;

/// Records every payload; optionally fails each call.
#[derive(Default, Clone)]
pub struct RecordingCrmNotifier {
    sent: Arc<Mutex<Vec<CrmPayload>>>,
    error: Arc<Mutex<Option<TransportError>>>,
}

impl RecordingCrmNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, error: TransportError) {
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    pub fn sent(&self) -> Vec<CrmPayload> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl CrmNotifier for RecordingCrmNotifier {
    async fn notify(&self, payload: &CrmPayload) -> Result<(), TransportError> {
        if let Some(error) = self.error.lock().unwrap_or_else(PoisonError::into_inner).clone() {
            return Err(error);
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload.clone());
        Ok(())
    }
}

/// Used when no webhook URL is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCrmNotifier;

#[async_trait]
impl CrmNotifier for NoopCrmNotifier {
    async fn notify(&self, payload: &CrmPayload) -> Result<(), TransportError> {
        tracing::debug!(event = %payload.event, "CRM webhook not configured, skipping");
        Ok(())
    }
}
