//! Product database tier, used for both the function and the direct transport.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::catalog::{Bike, BikeVariation};
use crate::ports::{ProductDatabase, ProductOrigin, ProductSource, SourceError};

use super::catalogue::{assemble_catalogue, parse_product_id};

pub struct DatabaseSource {
    origin: ProductOrigin,
    database: Arc<dyn ProductDatabase>,
}

impl DatabaseSource {
    /// Tier backed by the serverless function.
    pub fn function(database: Arc<dyn ProductDatabase>) -> Self {
        Self {
            origin: ProductOrigin::DatabaseFunction,
            database,
        }
    }

    /// Tier backed by the direct driver connection.
    pub fn direct(database: Arc<dyn ProductDatabase>) -> Self {
        Self {
            origin: ProductOrigin::DirectDatabase,
            database,
        }
    }
}

#[async_trait]
impl ProductSource for DatabaseSource {
    fn origin(&self) -> ProductOrigin {
        self.origin
    }

    async fn fetch_all(&self) -> Result<Vec<Bike>, SourceError> {
        let products = self.database.get_products().await?;
        let database = &self.database;
        Ok(assemble_catalogue(self.origin, products, |id| database.get_variations(id)).await)
    }

    async fn fetch_variations(&self, bike_id: &str) -> Result<Vec<BikeVariation>, SourceError> {
        let id = parse_product_id(bike_id).ok_or_else(|| SourceError::InvalidId(bike_id.to_string()))?;
        let variations = self.database.get_variations(id).await?;
        Ok(variations.iter().map(BikeVariation::from).collect())
    }
}
