//! WooCommerce REST client.
//!
//! Implements `CommerceApi` against `/wp-json/wc/v3`. Every request runs
//! through the shared `ResilienceContext` under `Dependency::Commerce`.
//!
//! # Security
//!
//! Consumer key and secret are held as `SecretString` and only exposed when
//! building the Basic auth header.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::adapters::resilience::{classify_reqwest_error, decode_json, ResilienceContext};
use crate::domain::catalog::{ProductRecord, VariationRecord};
use crate::domain::checkout::{CreatedOrder, OrderDraft};
use crate::domain::resilience::{Dependency, TransportError};
use crate::ports::{CommerceApi, ProductQuery};

const API_ROOT: &str = "wp-json/wc/v3";

/// Connection settings for the store.
#[derive(Clone)]
pub struct WooCommerceConfig {
    /// Store base URL, e.g. `https://shop.example.com`.
    base_url: String,
    consumer_key: SecretString,
    consumer_secret: SecretString,
}

impl WooCommerceConfig {
    pub fn new(
        base_url: impl Into<String>,
        consumer_key: SecretString,
        consumer_secret: SecretString,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            consumer_key,
            consumer_secret,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), API_ROOT, path)
    }
}

impl std::fmt::Debug for WooCommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceConfig")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    id: u64,
    slug: String,
}

/// `CommerceApi` over HTTP.
pub struct WooCommerceClient {
    config: WooCommerceConfig,
    http: reqwest::Client,
    resilience: Arc<ResilienceContext>,
    /// Category slug to id; categories almost never change at runtime.
    category_ids: RwLock<HashMap<String, u64>>,
}

impl WooCommerceClient {
    pub fn new(config: WooCommerceConfig, http: reqwest::Client, resilience: Arc<ResilienceContext>) -> Self {
        Self {
            config,
            http,
            resilience,
            category_ids: RwLock::new(HashMap::new()),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(self.config.endpoint(path))
            .basic_auth(
                self.config.consumer_key.expose_secret(),
                Some(self.config.consumer_secret.expose_secret()),
            )
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.config.endpoint(path))
            .basic_auth(
                self.config.consumer_key.expose_secret(),
                Some(self.config.consumer_secret.expose_secret()),
            )
    }

    /// Resolves a category slug to its id, caching hits.
    async fn category_id(&self, slug: &str) -> Result<Option<u64>, TransportError> {
        if let Some(id) = self.category_ids.read().await.get(slug) {
            return Ok(Some(*id));
        }

        let rows: Vec<CategoryRow> = self
            .resilience
            .execute(Dependency::Commerce, || async {
                let response = self
                    .get("products/categories")
                    .query(&[("slug", slug)])
                    .send()
                    .await
                    .map_err(|e| classify_reqwest_error(Dependency::Commerce, e))?;
                decode_json(Dependency::Commerce, response).await
            })
            .await?;

        let id = rows.into_iter().find(|row| row.slug == slug).map(|row| row.id);
        match id {
            Some(id) => {
                self.category_ids.write().await.insert(slug.to_string(), id);
            }
            None => tracing::warn!(category = slug, "Commerce category not found"),
        }
        Ok(id)
    }
}

#[async_trait]
impl CommerceApi for WooCommerceClient {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<ProductRecord>, TransportError> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", query.page.to_string()),
            ("per_page", query.per_page.to_string()),
        ];
        if let Some(status) = &query.status {
            params.push(("status", status.clone()));
        }
        if let Some(slug) = &query.category {
            match self.category_id(slug).await? {
                Some(id) => params.push(("category", id.to_string())),
                None => return Ok(Vec::new()),
            }
        }

        let products: Vec<ProductRecord> = self
            .resilience
            .execute(Dependency::Commerce, || async {
                let response = self
                    .get("products")
                    .query(&params)
                    .send()
                    .await
                    .map_err(|e| classify_reqwest_error(Dependency::Commerce, e))?;
                decode_json(Dependency::Commerce, response).await
            })
            .await?;

        tracing::debug!(page = query.page, count = products.len(), "Fetched commerce products");
        Ok(products)
    }

    async fn list_variations(&self, product_id: u64) -> Result<Vec<VariationRecord>, TransportError> {
        let path = format!("products/{}/variations", product_id);
        self.resilience
            .execute(Dependency::Commerce, || async {
                let response = self
                    .get(&path)
                    .query(&[("per_page", "100")])
                    .send()
                    .await
                    .map_err(|e| classify_reqwest_error(Dependency::Commerce, e))?;
                decode_json(Dependency::Commerce, response).await
            })
            .await
    }

    async fn create_order(&self, order: &OrderDraft) -> Result<CreatedOrder, TransportError> {
        let created: CreatedOrder = self
            .resilience
            .execute(Dependency::Commerce, || async {
                let response = self
                    .post("orders")
                    .json(order)
                    .send()
                    .await
                    .map_err(|e| classify_reqwest_error(Dependency::Commerce, e))?;
                decode_json(Dependency::Commerce, response).await
            })
            .await?;

        tracing::info!(order_id = created.id, "Commerce order created");
        Ok(created)
    }
}

impl std::fmt::Debug for WooCommerceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
