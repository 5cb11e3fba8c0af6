//! PostgreSQL implementation of ProductDatabase.
//!
//! Direct driver connection to the same product tables the serverless
//! function serves. Nested objects (categories, images, attributes, meta) are
//! stored as JSON text so rows mirror the commerce product shape.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::adapters::resilience::ResilienceContext;
use crate::domain::catalog::{ProductRecord, ProductType, StockStatus, VariationRecord};
use crate::domain::resilience::{Dependency, TransportError};
use crate::ports::ProductDatabase;

const DEPENDENCY: Dependency = Dependency::Database;

const PRODUCT_COLUMNS: &str = "id, name, slug, product_type, status, price, regular_price, \
     sale_price, stock_quantity, stock_status, categories, images, variation_ids, meta_data, \
     description, short_description";

const VARIATION_COLUMNS: &str = "id, price, regular_price, sale_price, stock_quantity, \
     stock_status, attributes, meta_data";

/// PostgreSQL implementation of ProductDatabase.
#[derive(Clone)]
pub struct PostgresProductDatabase {
    pool: PgPool,
    resilience: Arc<ResilienceContext>,
}

impl PostgresProductDatabase {
    pub fn new(pool: PgPool, resilience: Arc<ResilienceContext>) -> Self {
        Self { pool, resilience }
    }
}

#[async_trait]
impl ProductDatabase for PostgresProductDatabase {
    async fn get_products(&self) -> Result<Vec<ProductRecord>, TransportError> {
        self.resilience
            .execute(DEPENDENCY, || async {
                let rows = sqlx::query(&format!(
                    "SELECT {} FROM rental_products WHERE status = 'publish' ORDER BY id",
                    PRODUCT_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| classify_sqlx_error("fetch products", e))?;

                rows.iter().map(row_to_product).collect()
            })
            .await
    }

    async fn get_product_by_id(&self, id: u64) -> Result<Option<ProductRecord>, TransportError> {
        self.resilience
            .execute(DEPENDENCY, || async {
                let row = sqlx::query(&format!(
                    "SELECT {} FROM rental_products WHERE id = $1",
                    PRODUCT_COLUMNS
                ))
                .bind(id as i64)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| classify_sqlx_error("fetch product", e))?;

                row.as_ref().map(row_to_product).transpose()
            })
            .await
    }

    async fn get_variations(&self, product_id: u64) -> Result<Vec<VariationRecord>, TransportError> {
        self.resilience
            .execute(DEPENDENCY, || async {
                let rows = sqlx::query(&format!(
                    "SELECT {} FROM rental_variations WHERE product_id = $1 ORDER BY id",
                    VARIATION_COLUMNS
                ))
                .bind(product_id as i64)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| classify_sqlx_error("fetch variations", e))?;

                rows.iter().map(row_to_variation).collect()
            })
            .await
    }

    async fn upsert_product(
        &self,
        product: &ProductRecord,
        variations: &[VariationRecord],
    ) -> Result<(), TransportError> {
        self.resilience
            .execute(DEPENDENCY, || async {
                let mut tx = self
                    .pool
                    .begin()
                    .await
                    .map_err(|e| classify_sqlx_error("begin upsert", e))?;

                sqlx::query(
                    r#"
                    INSERT INTO rental_products (
                        id, name, slug, product_type, status, price, regular_price,
                        sale_price, stock_quantity, stock_status, categories, images,
                        variation_ids, meta_data, description, short_description, synced_at
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, NOW())
                    ON CONFLICT (id) DO UPDATE SET
                        name = EXCLUDED.name,
                        slug = EXCLUDED.slug,
                        product_type = EXCLUDED.product_type,
                        status = EXCLUDED.status,
                        price = EXCLUDED.price,
                        regular_price = EXCLUDED.regular_price,
                        sale_price = EXCLUDED.sale_price,
                        stock_quantity = EXCLUDED.stock_quantity,
                        stock_status = EXCLUDED.stock_status,
                        categories = EXCLUDED.categories,
                        images = EXCLUDED.images,
                        variation_ids = EXCLUDED.variation_ids,
                        meta_data = EXCLUDED.meta_data,
                        description = EXCLUDED.description,
                        short_description = EXCLUDED.short_description,
                        synced_at = NOW()
                    "#,
                )
                .bind(product.id as i64)
                .bind(&product.name)
                .bind(&product.slug)
                .bind(product_type_to_str(product.product_type))
                .bind(&product.status)
                .bind(&product.price)
                .bind(&product.regular_price)
                .bind(&product.sale_price)
                .bind(product.stock_quantity)
                .bind(product.stock_status.as_str())
                .bind(to_json_text(&product.categories)?)
                .bind(to_json_text(&product.images)?)
                .bind(to_json_text(&product.variations)?)
                .bind(to_json_text(&product.meta_data)?)
                .bind(&product.description)
                .bind(&product.short_description)
                .execute(&mut *tx)
                .await
                .map_err(|e| classify_sqlx_error("upsert product", e))?;

                sqlx::query("DELETE FROM rental_variations WHERE product_id = $1")
                    .bind(product.id as i64)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| classify_sqlx_error("clear variations", e))?;

                for variation in variations {
                    sqlx::query(
                        r#"
                        INSERT INTO rental_variations (
                            id, product_id, price, regular_price, sale_price,
                            stock_quantity, stock_status, attributes, meta_data
                        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                        "#,
                    )
                    .bind(variation.id as i64)
                    .bind(product.id as i64)
                    .bind(&variation.price)
                    .bind(&variation.regular_price)
                    .bind(&variation.sale_price)
                    .bind(variation.stock_quantity)
                    .bind(variation.stock_status.as_str())
                    .bind(to_json_text(&variation.attributes)?)
                    .bind(to_json_text(&variation.meta_data)?)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| classify_sqlx_error("insert variation", e))?;
                }

                tx.commit()
                    .await
                    .map_err(|e| classify_sqlx_error("commit upsert", e))
            })
            .await
    }

    async fn create_table_if_missing(&self) -> Result<(), TransportError> {
        self.resilience
            .execute(DEPENDENCY, || async {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS rental_products (
                        id BIGINT PRIMARY KEY,
                        name TEXT NOT NULL,
                        slug TEXT NOT NULL DEFAULT '',
                        product_type TEXT NOT NULL DEFAULT 'simple',
                        status TEXT NOT NULL DEFAULT 'publish',
                        price TEXT NOT NULL DEFAULT '',
                        regular_price TEXT NOT NULL DEFAULT '',
                        sale_price TEXT NOT NULL DEFAULT '',
                        stock_quantity BIGINT,
                        stock_status TEXT NOT NULL DEFAULT 'instock',
                        categories TEXT NOT NULL DEFAULT '[]',
                        images TEXT NOT NULL DEFAULT '[]',
                        variation_ids TEXT NOT NULL DEFAULT '[]',
                        meta_data TEXT NOT NULL DEFAULT '[]',
                        description TEXT NOT NULL DEFAULT '',
                        short_description TEXT NOT NULL DEFAULT '',
                        synced_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                    )
                    "#,
                )
                .execute(&self.pool)
                .await
                .map_err(|e| classify_sqlx_error("create products table", e))?;

                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS rental_variations (
                        id BIGINT PRIMARY KEY,
                        product_id BIGINT NOT NULL REFERENCES rental_products(id) ON DELETE CASCADE,
                        price TEXT NOT NULL DEFAULT '',
                        regular_price TEXT NOT NULL DEFAULT '',
                        sale_price TEXT NOT NULL DEFAULT '',
                        stock_quantity BIGINT,
                        stock_status TEXT NOT NULL DEFAULT 'instock',
                        attributes TEXT NOT NULL DEFAULT '[]',
                        meta_data TEXT NOT NULL DEFAULT '[]'
                    )
                    "#,
                )
                .execute(&self.pool)
                .await
                .map_err(|e| classify_sqlx_error("create variations table", e))?;

                sqlx::query(
                    "CREATE INDEX IF NOT EXISTS rental_variations_product_idx ON rental_variations (product_id)",
                )
                .execute(&self.pool)
                .await
                .map_err(|e| classify_sqlx_error("create variations index", e))?;

                tracing::info!("Product tables ready");
                Ok(())
            })
            .await
    }
}

/// Connection-level failures are network errors; anything about the data
/// itself is a shape error.
fn classify_sqlx_error(operation: &str, error: sqlx::Error) -> TransportError {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Database(_) => {
            TransportError::network(DEPENDENCY, format!("Failed to {}: {}", operation, error))
        }
        other => TransportError::shape(DEPENDENCY, format!("Failed to {}: {}", operation, other)),
    }
}

fn to_json_text<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, TransportError> {
    serde_json::to_string(value)
        .map_err(|e| TransportError::shape(DEPENDENCY, format!("Failed to encode column: {}", e)))
}

fn from_json_text<T: serde::de::DeserializeOwned>(column: &str, raw: &str) -> Result<T, TransportError> {
    serde_json::from_str(raw).map_err(|e| {
        TransportError::shape(DEPENDENCY, format!("Invalid JSON in column {}: {}", column, e))
    })
}

fn product_type_to_str(product_type: ProductType) -> &'static str {
    match product_type {
        ProductType::Simple => "simple",
        ProductType::Variable => "variable",
        ProductType::Other => "other",
    }
}

fn str_to_product_type(raw: &str) -> ProductType {
    match raw {
        "simple" => ProductType::Simple,
        "variable" => ProductType::Variable,
        _ => ProductType::Other,
    }
}

fn str_to_stock_status(raw: &str) -> StockStatus {
    match raw {
        "instock" => StockStatus::InStock,
        "outofstock" => StockStatus::OutOfStock,
        "onbackorder" => StockStatus::OnBackorder,
        _ => StockStatus::Unknown,
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, TransportError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| classify_sqlx_error("decode row", e))
}

fn row_to_product(row: &PgRow) -> Result<ProductRecord, TransportError> {
    let id: i64 = column(row, "id")?;
    let product_type: String = column(row, "product_type")?;
    let stock_status: String = column(row, "stock_status")?;
    let categories: String = column(row, "categories")?;
    let images: String = column(row, "images")?;
    let variation_ids: String = column(row, "variation_ids")?;
    let meta_data: String = column(row, "meta_data")?;

    Ok(ProductRecord {
        id: id.max(0) as u64,
        name: column(row, "name")?,
        slug: column(row, "slug")?,
        product_type: str_to_product_type(&product_type),
        status: column(row, "status")?,
        price: column(row, "price")?,
        regular_price: column(row, "regular_price")?,
        sale_price: column(row, "sale_price")?,
        stock_quantity: column(row, "stock_quantity")?,
        stock_status: str_to_stock_status(&stock_status),
        categories: from_json_text("categories", &categories)?,
        images: from_json_text("images", &images)?,
        variations: from_json_text("variation_ids", &variation_ids)?,
        meta_data: from_json_text("meta_data", &meta_data)?,
        description: column(row, "description")?,
        short_description: column(row, "short_description")?,
    })
}

fn row_to_variation(row: &PgRow) -> Result<VariationRecord, TransportError> {
    let id: i64 = column(row, "id")?;
    let stock_status: String = column(row, "stock_status")?;
    let attributes: String = column(row, "attributes")?;
    let meta_data: String = column(row, "meta_data")?;

    Ok(VariationRecord {
        id: id.max(0) as u64,
        price: column(row, "price")?,
        regular_price: column(row, "regular_price")?,
        sale_price: column(row, "sale_price")?,
        stock_quantity: column(row, "stock_quantity")?,
        stock_status: str_to_stock_status(&stock_status),
        attributes: from_json_text("attributes", &attributes)?,
        meta_data: from_json_text("meta_data", &meta_data)?,
    })
}
