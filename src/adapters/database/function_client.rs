//! Product database over the managed serverless-function endpoint.
//!
//! Every operation is a `POST` of `{"action": .., "data": ..}`; the function
//! answers `{"success": bool, "data": .., "error": ..}`. A non-JSON body (an
//! HTML error page from the hosting platform, typically) is a shape error so
//! the resolver moves on to the next tier instead of retrying.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::resilience::{classify_reqwest_error, decode_json, ResilienceContext};
use crate::domain::catalog::{ProductRecord, VariationRecord};
use crate::domain::resilience::{Dependency, TransportError};
use crate::ports::ProductDatabase;

const DEPENDENCY: Dependency = Dependency::Functions;

#[derive(Debug, Serialize)]
struct FunctionRequest<'a> {
    action: &'a str,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct FunctionResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

/// `ProductDatabase` backed by the product-sync function.
pub struct FunctionDatabaseClient {
    url: String,
    http: reqwest::Client,
    resilience: Arc<ResilienceContext>,
}

impl FunctionDatabaseClient {
    pub fn new(url: impl Into<String>, http: reqwest::Client, resilience: Arc<ResilienceContext>) -> Self {
        Self {
            url: url.into(),
            http,
            resilience,
        }
    }

    async fn call<T: DeserializeOwned>(&self, action: &str, data: Value) -> Result<Option<T>, TransportError> {
        let envelope: FunctionResponse<T> = self
            .resilience
            .execute(DEPENDENCY, || async {
                let response = self
                    .http
                    .post(&self.url)
                    .json(&FunctionRequest { action, data })
                    .send()
                    .await
                    .map_err(|e| classify_reqwest_error(DEPENDENCY, e))?;
                let envelope: FunctionResponse<T> = decode_json(DEPENDENCY, response).await?;
                if !envelope.success {
                    return Err(TransportError::shape(
                        DEPENDENCY,
                        format!(
                            "{} reported failure: {}",
                            action,
                            envelope.error.as_deref().unwrap_or("no error message")
                        ),
                    ));
                }
                Ok(envelope)
            })
            .await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl ProductDatabase for FunctionDatabaseClient {
    async fn get_products(&self) -> Result<Vec<ProductRecord>, TransportError> {
        let products: Option<Vec<ProductRecord>> = self.call("getProducts", Value::Null).await?;
        products.ok_or_else(|| TransportError::shape(DEPENDENCY, "getProducts returned no data"))
    }

    async fn get_product_by_id(&self, id: u64) -> Result<Option<ProductRecord>, TransportError> {
        self.call("getProductById", json!({ "id": id })).await
    }

    async fn get_variations(&self, product_id: u64) -> Result<Vec<VariationRecord>, TransportError> {
        let variations: Option<Vec<VariationRecord>> = self
            .call("getVariations", json!({ "productId": product_id }))
            .await?;
        Ok(variations.unwrap_or_default())
    }

    async fn upsert_product(
        &self,
        product: &ProductRecord,
        variations: &[VariationRecord],
    ) -> Result<(), TransportError> {
        let _: Option<Value> = self
            .call(
                "upsertProduct",
                json!({ "product": product, "variations": variations }),
            )
            .await?;
        Ok(())
    }

    async fn create_table_if_missing(&self) -> Result<(), TransportError> {
        let _: Option<Value> = self.call("createTableIfMissing", Value::Null).await?;
        Ok(())
    }
}

impl std::fmt::Debug for FunctionDatabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDatabaseClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::resilience::parse_json;

    #[test]
    fn request_envelope_shape() {
        let body = serde_json::to_value(FunctionRequest {
            action: "getVariations",
            data: json!({ "productId": 12 }),
        })
        .unwrap();
        assert_eq!(body, json!({"action": "getVariations", "data": {"productId": 12}}));
    }

    #[test]
    fn response_envelope_tolerates_missing_data() {
        let envelope: FunctionResponse<Vec<ProductRecord>> =
            parse_json(DEPENDENCY, br#"{"success": true}"#).unwrap();
        assert!(envelope.success);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn html_error_page_is_shape_error() {
        let err = parse_json::<FunctionResponse<Vec<ProductRecord>>>(
            DEPENDENCY,
            b"<html><body>502 Bad Gateway</body></html>",
        )
        .unwrap_err();
        assert!(matches!(err, TransportError::Shape { .. }));
    }
}
