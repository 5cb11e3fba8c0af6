//! Hard-coded catalogue, the last resort when nothing else answers.

use async_trait::async_trait;

use crate::domain::catalog::{static_bikes, Bike, BikeVariation};
use crate::ports::{ProductOrigin, ProductSource, SourceError};

#[derive(Debug, Default, Clone, Copy)]
pub struct StaticSource;

#[async_trait]
impl ProductSource for StaticSource {
    fn origin(&self) -> ProductOrigin {
        ProductOrigin::Static
    }

    async fn fetch_all(&self) -> Result<Vec<Bike>, SourceError> {
        Ok(static_bikes())
    }

    async fn fetch_variations(&self, bike_id: &str) -> Result<Vec<BikeVariation>, SourceError> {
        static_bikes()
            .into_iter()
            .find(|bike| bike.id == bike_id)
            .map(|bike| bike.variations)
            .ok_or_else(|| SourceError::NotFound(bike_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn never_empty() {
        assert!(!StaticSource.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_bike_is_not_found() {
        let err = StaticSource.fetch_variations("1").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }
}
