//! CRM notification adapters.
//!
//! - `CrmWebhookClient` - Signed JSON webhook over reqwest
//! - `NoopCrmNotifier` - Used when no webhook is configured
//! - `RecordingCrmNotifier` - Captures payloads in tests

mod recording;
mod webhook;

pub use recording::{NoopCrmNotifier, RecordingCrmNotifier};
pub use webhook::{sign_payload, CrmWebhookClient, SIGNATURE_HEADER};
