//! Turning product records into bikes, fetching variations concurrently.

use std::future::Future;

use futures::future::join_all;

use crate::domain::catalog::{assemble_bike, Bike, ProductRecord, VariationRecord};
use crate::domain::resilience::TransportError;
use crate::ports::ProductOrigin;

/// Builds a bike per product. Variable products get their variations from
/// `fetch`; a failed fetch degrades that product to its own stock fields.
pub(super) async fn assemble_catalogue<F, Fut>(
    origin: ProductOrigin,
    products: Vec<ProductRecord>,
    fetch: F,
) -> Vec<Bike>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<Vec<VariationRecord>, TransportError>>,
{
    let fetches = products.iter().map(|product| {
        let pending = product.is_variable().then(|| fetch(product.id));
        async move {
            match pending {
                Some(pending) => Some(pending.await),
                None => None,
            }
        }
    });
    let fetched = join_all(fetches).await;

    products
        .iter()
        .zip(fetched)
        .map(|(product, variations)| match variations {
            Some(Ok(variations)) => assemble_bike(product, Some(variations.as_slice())),
            Some(Err(error)) => {
                tracing::warn!(
                    source = %origin,
                    product_id = product.id,
                    error = %error,
                    "Variation fetch failed, using product stock"
                );
                assemble_bike(product, None)
            }
            None => assemble_bike(product, None),
        })
        .collect()
}

/// Numeric commerce id from a bike id.
pub(super) fn parse_product_id(bike_id: &str) -> Option<u64> {
    bike_id.trim().parse().ok()
}
