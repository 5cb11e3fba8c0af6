//! Mock commerce API for testing.
//!
//! Supports:
//! - Pre-configured products and variations
//! - Error injection per operation
//! - Artificial latency on product listing
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::catalog::{ProductRecord, VariationRecord};
use crate::domain::checkout::{CreatedOrder, OrderDraft};
use crate::domain::resilience::TransportError;
use crate::ports::{CommerceApi, ProductQuery};

/// Mock commerce backend.
///
/// # Example
///
/// ```ignore
/// let mock = MockCommerceApi::new();
/// mock.set_products(vec![product]);
/// mock.fail_products(TransportError::network(Dependency::Commerce, "down"));
/// ```
#[derive(Default, Clone)]
pub struct MockCommerceApi {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    products: Vec<ProductRecord>,
    variations: HashMap<u64, Vec<VariationRecord>>,
    products_error: Option<TransportError>,
    products_delay: Duration,
    variation_errors: HashMap<u64, TransportError>,
    order_error: Option<TransportError>,
    next_order_id: u64,
    orders: Vec<OrderDraft>,
    product_calls: usize,
    variation_calls: usize,
}

impl MockCommerceApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn set_products(&self, products: Vec<ProductRecord>) {
        self.state().products = products;
    }

    pub fn set_variations(&self, product_id: u64, variations: Vec<VariationRecord>) {
        self.state().variations.insert(product_id, variations);
    }

    pub fn fail_products(&self, error: TransportError) {
        self.state().products_error = Some(error);
    }

    /// Every product listing sleeps this long before answering.
    pub fn delay_products(&self, delay: Duration) {
        self.state().products_delay = delay;
    }

    pub fn fail_variations(&self, product_id: u64, error: TransportError) {
        self.state().variation_errors.insert(product_id, error);
    }

    pub fn fail_orders(&self, error: TransportError) {
        self.state().order_error = Some(error);
    }

    /// Orders received so far.
    pub fn orders(&self) -> Vec<OrderDraft> {
        self.state().orders.clone()
    }

    pub fn product_calls(&self) -> usize {
        self.state().product_calls
    }

    pub fn variation_calls(&self) -> usize {
        self.state().variation_calls
    }
}

#[async_trait]
impl CommerceApi for MockCommerceApi {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<ProductRecord>, TransportError> {
        let delay = self.state().products_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        state.product_calls += 1;
        if let Some(error) = &state.products_error {
            return Err(error.clone());
        }
        let start = ((query.page.max(1) - 1) * query.per_page) as usize;
        Ok(state
            .products
            .iter()
            .filter(|product| match &query.category {
                Some(slug) => product.categories.iter().any(|c| &c.slug == slug),
                None => true,
            })
            .skip(start)
            .take(query.per_page as usize)
            .cloned()
            .collect())
    }

    async fn list_variations(&self, product_id: u64) -> Result<Vec<VariationRecord>, TransportError> {
        let mut state = self.state();
        state.variation_calls += 1;
        if let Some(error) = state.variation_errors.get(&product_id) {
            return Err(error.clone());
        }
        Ok(state.variations.get(&product_id).cloned().unwrap_or_default())
    }

    async fn create_order(&self, order: &OrderDraft) -> Result<CreatedOrder, TransportError> {
        let mut state = self.state();
        if let Some(error) = &state.order_error {
            return Err(error.clone());
        }
        state.next_order_id += 1;
        let id = 1000 + state.next_order_id;
        state.orders.push(order.clone());
        Ok(CreatedOrder {
            id,
            order_key: format!("wc_order_mock{}", id),
        })
    }
}
