//! Shared state for every route.

use std::sync::Arc;

use crate::adapters::resilience::ResilienceContext;
use crate::application::{ProductResolver, SubmitCheckoutHandler, SyncService};
use crate::domain::pricing::SelectedBike;

use super::catalog::BikeSelectionRequest;
use super::error::ApiError;

/// Cloned into each request; everything behind it is `Arc`-shared.
#[derive(Clone)]
pub struct AppState {
    pub resolver: ProductResolver,
    pub checkout: Arc<SubmitCheckoutHandler>,
    /// `None` when no product database is configured.
    pub sync: Option<Arc<SyncService>>,
    pub resilience: Arc<ResilienceContext>,
}

impl AppState {
    /// Looks up every requested bike through the resolver so prices come from
    /// catalogue data, never from the request.
    pub async fn selected_bikes(
        &self,
        requests: &[BikeSelectionRequest],
    ) -> Result<Vec<SelectedBike>, ApiError> {
        let mut selected = Vec::with_capacity(requests.len());
        for request in requests {
            let bike = self.resolver.find_bike(&request.bike_id).await?;
            let mut line = SelectedBike::new(bike, request.quantity);
            if let Some(size) = &request.size {
                line = line.with_size(size.clone());
            }
            if let Some(price) = request.displayed_price_per_day {
                line = line.with_displayed_price(price);
            }
            selected.push(line);
        }
        Ok(selected)
    }
}
