//! Commerce API port - the WooCommerce-style REST backend.
//!
//! Owns the product catalogue and order creation. Adapters are expected to
//! route every call through the resilience layer and report failures as
//! `TransportError`.

use async_trait::async_trait;

use crate::domain::catalog::{ProductRecord, VariationRecord};
use crate::domain::checkout::{CreatedOrder, OrderDraft};
use crate::domain::resilience::TransportError;

/// Upper bound on pages fetched by `list_all_products`.
pub const MAX_PRODUCT_PAGES: u32 = 20;

/// Filters for `GET /products`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Category slug; resolved to the backend's category id by the adapter.
    pub category: Option<String>,
    /// Publication status, usually `publish`.
    pub status: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            category: None,
            status: Some("publish".to_string()),
            page: 1,
            per_page: 100,
        }
    }
}

impl ProductQuery {
    pub fn in_category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    pub fn with_page_size(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, 100);
        self
    }

    fn at_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// Port for the commerce backend.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// One page of products.
    async fn list_products(&self, query: &ProductQuery)
        -> Result<Vec<ProductRecord>, TransportError>;

    /// Every page of products, stopping at the first short page.
    async fn list_all_products(
        &self,
        query: &ProductQuery,
    ) -> Result<Vec<ProductRecord>, TransportError> {
        let mut products = Vec::new();
        for page in query.page.max(1)..query.page.max(1) + MAX_PRODUCT_PAGES {
            let batch = self.list_products(&query.at_page(page)).await?;
            let short_page = (batch.len() as u32) < query.per_page;
            products.extend(batch);
            if short_page {
                break;
            }
        }
        Ok(products)
    }

    /// Variations of a variable product.
    async fn list_variations(&self, product_id: u64)
        -> Result<Vec<VariationRecord>, TransportError>;

    /// Creates a pending order.
    async fn create_order(&self, order: &OrderDraft) -> Result<CreatedOrder, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct PagedApi {
        total: usize,
        pages_requested: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl CommerceApi for PagedApi {
        async fn list_products(
            &self,
            query: &ProductQuery,
        ) -> Result<Vec<ProductRecord>, TransportError> {
            self.pages_requested.lock().unwrap().push(query.page);
            let start = ((query.page - 1) * query.per_page) as usize;
            let end = (start + query.per_page as usize).min(self.total);
            Ok((start..end)
                .map(|i| {
                    serde_json::from_value(serde_json::json!({"id": i as u64 + 1, "name": "b"}))
                        .unwrap()
                })
                .collect())
        }

        async fn list_variations(
            &self,
            _product_id: u64,
        ) -> Result<Vec<VariationRecord>, TransportError> {
            Ok(Vec::new())
        }

        async fn create_order(&self, _order: &OrderDraft) -> Result<CreatedOrder, TransportError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn list_all_products_follows_pages_until_short_page() {
        let api = PagedApi {
            total: 25,
            pages_requested: Mutex::new(Vec::new()),
        };
        let query = ProductQuery::default().with_page_size(10);
        let products = api.list_all_products(&query).await.unwrap();
        assert_eq!(products.len(), 25);
        assert_eq!(*api.pages_requested.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn list_all_products_stops_at_page_cap() {
        let api = PagedApi {
            total: 10_000,
            pages_requested: Mutex::new(Vec::new()),
        };
        let query = ProductQuery::default().with_page_size(10);
        let products = api.list_all_products(&query).await.unwrap();
        assert_eq!(products.len(), (MAX_PRODUCT_PAGES * 10) as usize);
    }

    #[test]
    fn page_size_is_clamped_to_api_maximum() {
        assert_eq!(ProductQuery::default().with_page_size(500).per_page, 100);
        assert_eq!(ProductQuery::default().with_page_size(0).per_page, 1);
    }
}
