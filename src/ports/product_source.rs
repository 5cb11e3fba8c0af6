//! Product source port - one tier of the product resolution chain.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::domain::catalog::{Bike, BikeVariation};
use crate::domain::resilience::TransportError;

/// Which tier produced a product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductOrigin {
    Cache,
    DatabaseFunction,
    DirectDatabase,
    CommerceApi,
    FallbackCache,
    Static,
}

impl ProductOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductOrigin::Cache => "cache",
            ProductOrigin::DatabaseFunction => "database_function",
            ProductOrigin::DirectDatabase => "direct_database",
            ProductOrigin::CommerceApi => "commerce_api",
            ProductOrigin::FallbackCache => "fallback_cache",
            ProductOrigin::Static => "static",
        }
    }

    /// Live data, as opposed to a cached or hard-coded snapshot.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            ProductOrigin::DatabaseFunction | ProductOrigin::DirectDatabase | ProductOrigin::CommerceApi
        )
    }

    /// Results from this tier are written back into the cache.
    pub fn is_cacheable(&self) -> bool {
        self.is_live()
    }
}

impl fmt::Display for ProductOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from a product source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("product {0} not found")]
    NotFound(String),

    #[error("invalid product id '{0}'")]
    InvalidId(String),
}

/// A tier of the resolution chain.
#[async_trait]
pub trait ProductSource: Send + Sync {
    fn origin(&self) -> ProductOrigin;

    /// Full catalogue from this tier.
    async fn fetch_all(&self) -> Result<Vec<Bike>, SourceError>;

    /// Variations of one bike from this tier.
    async fn fetch_variations(&self, bike_id: &str) -> Result<Vec<BikeVariation>, SourceError>;
}
