//! In-memory product database for testing.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::catalog::{ProductRecord, VariationRecord};
use crate::domain::resilience::TransportError;
use crate::ports::ProductDatabase;

/// Mock product database with error injection and upsert tracking.
#[derive(Default, Clone)]
pub struct MockProductDatabase {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    products: BTreeMap<u64, ProductRecord>,
    variations: BTreeMap<u64, Vec<VariationRecord>>,
    read_error: Option<TransportError>,
    write_error: Option<TransportError>,
    upserts: usize,
    table_created: bool,
}

impl MockProductDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the database with products.
    pub fn with_products(products: Vec<ProductRecord>) -> Self {
        let mock = Self::new();
        {
            let mut state = mock.state();
            for product in products {
                state.products.insert(product.id, product);
            }
        }
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_variations(&self, product_id: u64, variations: Vec<VariationRecord>) {
        self.state().variations.insert(product_id, variations);
    }

    /// Every read fails with `error` until cleared.
    pub fn fail_reads(&self, error: TransportError) {
        self.state().read_error = Some(error);
    }

    pub fn fail_writes(&self, error: TransportError) {
        self.state().write_error = Some(error);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.read_error = None;
        state.write_error = None;
    }

    pub fn upsert_count(&self) -> usize {
        self.state().upserts
    }

    pub fn product_count(&self) -> usize {
        self.state().products.len()
    }

    pub fn table_created(&self) -> bool {
        self.state().table_created
    }

    fn check_read(state: &MockState) -> Result<(), TransportError> {
        match &state.read_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProductDatabase for MockProductDatabase {
    async fn get_products(&self) -> Result<Vec<ProductRecord>, TransportError> {
        let state = self.state();
        Self::check_read(&state)?;
        Ok(state.products.values().cloned().collect())
    }

    async fn get_product_by_id(&self, id: u64) -> Result<Option<ProductRecord>, TransportError> {
        let state = self.state();
        Self::check_read(&state)?;
        Ok(state.products.get(&id).cloned())
    }

    async fn get_variations(&self, product_id: u64) -> Result<Vec<VariationRecord>, TransportError> {
        let state = self.state();
        Self::check_read(&state)?;
        Ok(state.variations.get(&product_id).cloned().unwrap_or_default())
    }

    async fn upsert_product(
        &self,
        product: &ProductRecord,
        variations: &[VariationRecord],
    ) -> Result<(), TransportError> {
        let mut state = self.state();
        if let Some(error) = &state.write_error {
            return Err(error.clone());
        }
        state.products.insert(product.id, product.clone());
        state.variations.insert(product.id, variations.to_vec());
        state.upserts += 1;
        Ok(())
    }

    async fn create_table_if_missing(&self) -> Result<(), TransportError> {
        let mut state = self.state();
        if let Some(error) = &state.write_error {
            return Err(error.clone());
        }
        state.table_created = true;
        Ok(())
    }
}
