//! Product database port.
//!
//! Secondary copy of the catalogue kept warm by the sync job. Two transports
//! implement it: the managed serverless-function endpoint and a direct
//! Postgres connection. Rows mirror the commerce product shape.

use async_trait::async_trait;

use crate::domain::catalog::{ProductRecord, VariationRecord};
use crate::domain::resilience::TransportError;

#[async_trait]
pub trait ProductDatabase: Send + Sync {
    async fn get_products(&self) -> Result<Vec<ProductRecord>, TransportError>;

    async fn get_product_by_id(&self, id: u64) -> Result<Option<ProductRecord>, TransportError>;

    async fn get_variations(&self, product_id: u64)
        -> Result<Vec<VariationRecord>, TransportError>;

    /// Inserts or replaces a product together with its variations.
    async fn upsert_product(
        &self,
        product: &ProductRecord,
        variations: &[VariationRecord],
    ) -> Result<(), TransportError>;

    /// Creates the product tables when absent. Idempotent.
    async fn create_table_if_missing(&self) -> Result<(), TransportError>;
}
