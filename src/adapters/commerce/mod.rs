//! Commerce backend adapters.
//!
//! - `WooCommerceClient` - WooCommerce REST API over reqwest
//! - `MockCommerceApi` - Configurable in-memory double for tests

mod mock;
mod woocommerce;

pub use mock::MockCommerceApi;
pub use woocommerce::{WooCommerceClient, WooCommerceConfig};
