//! Commerce API tier: reads the rental category straight from the store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::catalog::{Bike, BikeVariation};
use crate::ports::{CommerceApi, ProductOrigin, ProductQuery, ProductSource, SourceError};

use super::catalogue::{assemble_catalogue, parse_product_id};

pub struct CommerceSource {
    api: Arc<dyn CommerceApi>,
    query: ProductQuery,
}

impl CommerceSource {
    pub fn new(api: Arc<dyn CommerceApi>, category: impl Into<String>, page_size: u32) -> Self {
        Self {
            api,
            query: ProductQuery::default()
                .in_category(category)
                .with_page_size(page_size),
        }
    }
}

#[async_trait]
impl ProductSource for CommerceSource {
    fn origin(&self) -> ProductOrigin {
        ProductOrigin::CommerceApi
    }

    async fn fetch_all(&self) -> Result<Vec<Bike>, SourceError> {
        let products = self.api.list_all_products(&self.query).await?;
        let api = &self.api;
        Ok(assemble_catalogue(self.origin(), products, |id| api.list_variations(id)).await)
    }

    async fn fetch_variations(&self, bike_id: &str) -> Result<Vec<BikeVariation>, SourceError> {
        let id = parse_product_id(bike_id).ok_or_else(|| SourceError::InvalidId(bike_id.to_string()))?;
        let variations = self.api.list_variations(id).await?;
        Ok(variations.iter().map(BikeVariation::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::commerce::MockCommerceApi;
    use crate::domain::catalog::{ProductRecord, VariationRecord};
    use crate::domain::resilience::{Dependency, TransportError};
    use serde_json::json;

    fn product(id: u64, kind: &str, stock: i64, category: &str) -> ProductRecord {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("Bike {}", id),
            "type": kind,
            "price": "30",
            "stock_quantity": stock,
            "stock_status": "instock",
            "categories": [{"id": 1, "name": "Rentals", "slug": category}]
        }))
        .unwrap()
    }

    fn variation(id: u64, qty: i64, status: &str) -> VariationRecord {
        serde_json::from_value(json!({
            "id": id,
            "price": "28",
            "stock_quantity": qty,
            "stock_status": status,
            "attributes": [{"name": "Size", "option": "L"}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn only_in_stock_variations_count() {
        let api = MockCommerceApi::new();
        api.set_products(vec![product(1, "variable", 0, "rentals")]);
        api.set_variations(1, vec![variation(11, 3, "instock"), variation(12, 2, "outofstock")]);
        let source = CommerceSource::new(Arc::new(api), "rentals", 100);

        let bikes = source.fetch_all().await.unwrap();
        assert_eq!(bikes[0].available_quantity, 3);
    }

    #[tokio::test]
    async fn failed_variation_fetch_degrades_to_product_stock() {
        let api = MockCommerceApi::new();
        api.set_products(vec![
            product(1, "variable", 4, "rentals"),
            product(2, "simple", 7, "rentals"),
        ]);
        api.fail_variations(1, TransportError::network(Dependency::Commerce, "reset"));
        let source = CommerceSource::new(Arc::new(api.clone()), "rentals", 100);

        let bikes = source.fetch_all().await.unwrap();
        assert_eq!(bikes.len(), 2);
        assert_eq!(bikes[0].available_quantity, 4);
        assert_eq!(bikes[1].available_quantity, 7);
        assert_eq!(api.variation_calls(), 1, "simple products are not queried");
    }

    #[tokio::test]
    async fn products_outside_category_are_ignored() {
        let api = MockCommerceApi::new();
        api.set_products(vec![
            product(1, "simple", 1, "rentals"),
            product(2, "simple", 1, "accessories"),
        ]);
        let source = CommerceSource::new(Arc::new(api), "rentals", 100);

        let bikes = source.fetch_all().await.unwrap();
        assert_eq!(bikes.len(), 1);
        assert_eq!(bikes[0].id, "1");
    }
}
