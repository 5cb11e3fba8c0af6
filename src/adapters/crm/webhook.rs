//! CRM webhook client.
//!
//! Posts the reservation payload as JSON. When a signing secret is configured
//! the raw body is signed with HMAC-SHA256 and sent as
//! `X-Webhook-Signature: sha256=<hex>` so the receiver can authenticate it.

use std::sync::Arc;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::adapters::resilience::{classify_reqwest_error, ensure_success, ResilienceContext};
use crate::domain::checkout::CrmPayload;
use crate::domain::resilience::{Dependency, TransportError};
use crate::ports::CrmNotifier;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

pub struct CrmWebhookClient {
    url: String,
    signing_secret: Option<SecretString>,
    http: reqwest::Client,
    resilience: Arc<ResilienceContext>,
}

impl CrmWebhookClient {
    pub fn new(url: impl Into<String>, http: reqwest::Client, resilience: Arc<ResilienceContext>) -> Self {
        Self {
            url: url.into(),
            signing_secret: None,
            http,
            resilience,
        }
    }

    pub fn with_signing_secret(mut self, secret: SecretString) -> Self {
        self.signing_secret = Some(secret);
        self
    }
}

/// `sha256=<hex>` signature of `body`.
pub fn sign_payload(secret: &SecretString, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()).ok()?;
    mac.update(body);
    Some(format!("sha256={}", hex_encode(&mac.finalize().into_bytes())))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[async_trait]
impl CrmNotifier for CrmWebhookClient {
    async fn notify(&self, payload: &CrmPayload) -> Result<(), TransportError> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| TransportError::shape(Dependency::Crm, format!("payload encoding: {}", e)))?;
        let signature = self
            .signing_secret
            .as_ref()
            .and_then(|secret| sign_payload(secret, &body));

        self.resilience
            .execute(Dependency::Crm, || async {
                let mut request = self
                    .http
                    .post(&self.url)
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(body.clone());
                if let Some(signature) = &signature {
                    request = request.header(SIGNATURE_HEADER, signature);
                }
                let response = request
                    .send()
                    .await
                    .map_err(|e| classify_reqwest_error(Dependency::Crm, e))?;
                ensure_success(Dependency::Crm, response).await?;
                Ok(())
            })
            .await?;

        tracing::debug!(event = %payload.event, "CRM notified");
        Ok(())
    }
}

impl std::fmt::Debug for CrmWebhookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmWebhookClient")
            .field("url", &self.url)
            .field("signed", &self.signing_secret.is_some())
            .finish_non_exhaustive()
    }
}
