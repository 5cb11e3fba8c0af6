//! ProductResolver - one ordered walk over the product tiers.
//!
//! Resolution order:
//! 1. Primary cache. A stale hit is still served, and a refresh starts in
//!    the background.
//! 2. Each live source in turn (function, direct database, commerce API).
//!    A failure or an empty list moves on to the next tier.
//! 3. The long-lived fallback snapshot.
//! 4. The last-resort source (the static catalogue).
//!
//! Tiers never run in parallel. A live answer is written to both cache tiers;
//! snapshot and static answers are not written back.
//!
//! Concurrent callers join the resolution already in flight instead of
//! starting a second one.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;

use crate::adapters::cache::InstantCache;
use crate::domain::catalog::{Bike, BikeVariation};
use crate::ports::{ProductOrigin, ProductSource, SourceError};

/// One tier that did not answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierAttempt {
    pub origin: ProductOrigin,
    pub outcome: String,
}

/// Products plus the tier that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub products: Vec<Bike>,
    pub origin: ProductOrigin,
    /// Tiers tried before `origin` answered.
    pub attempts: Vec<TierAttempt>,
}

impl Resolution {
    /// Data is not from a live source or a fresh copy of one.
    pub fn is_degraded(&self) -> bool {
        matches!(self.origin, ProductOrigin::FallbackCache | ProductOrigin::Static)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolutionError {
    #[error("every product tier failed ({} attempts), last: {last}", attempts.len())]
    Exhausted {
        attempts: Vec<TierAttempt>,
        last: SourceError,
    },

    #[error("bike {0} not found")]
    NotFound(String),
}

type InFlight = Shared<BoxFuture<'static, Result<Resolution, ResolutionError>>>;

struct ResolverInner {
    cache: Arc<InstantCache>,
    sources: Vec<Arc<dyn ProductSource>>,
    last_resort: Arc<dyn ProductSource>,
    in_flight: Mutex<Option<InFlight>>,
}

/// Coordinates the product tiers.
#[derive(Clone)]
pub struct ProductResolver {
    inner: Arc<ResolverInner>,
}

impl ProductResolver {
    /// `sources` are tried in order; `last_resort` answers when they all fail
    /// and no fallback snapshot exists.
    pub fn new(
        cache: Arc<InstantCache>,
        sources: Vec<Arc<dyn ProductSource>>,
        last_resort: Arc<dyn ProductSource>,
    ) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                cache,
                sources,
                last_resort,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Full catalogue, out-of-stock bikes included.
    pub async fn resolve(&self) -> Result<Resolution, ResolutionError> {
        if let Some(entry) = self.inner.cache.products().await {
            if self.inner.cache.is_stale(&entry) {
                self.refresh_in_background();
            }
            return Ok(Resolution {
                products: entry.payload,
                origin: ProductOrigin::Cache,
                attempts: Vec::new(),
            });
        }
        ResolverInner::run_shared(&self.inner).await
    }

    /// Catalogue for the booking list: only bikes with stock.
    pub async fn resolve_for_sale(&self) -> Result<Resolution, ResolutionError> {
        let mut resolution = self.resolve().await?;
        resolution.products.retain(Bike::is_available);
        Ok(resolution)
    }

    /// Skips the cache and walks the tiers now.
    pub async fn refresh(&self) -> Result<Resolution, ResolutionError> {
        ResolverInner::run_shared(&self.inner).await
    }

    /// Starts a resolution without waiting for it.
    pub fn refresh_in_background(&self) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            match ResolverInner::run_shared(&inner).await {
                Ok(resolution) => tracing::debug!(
                    source = %resolution.origin,
                    count = resolution.products.len(),
                    "Background product refresh finished"
                ),
                Err(e) => tracing::warn!(error = %e, "Background product refresh failed"),
            }
        });
    }

    /// One bike by id, through the endpoint cache.
    pub async fn find_bike(&self, bike_id: &str) -> Result<Bike, ResolutionError> {
        let key = format!("product:{}", bike_id);
        if let Some(bike) = self.inner.cache.endpoint::<Bike>(&key).await {
            return Ok(bike);
        }

        let resolution = self.resolve().await?;
        let bike = resolution
            .products
            .into_iter()
            .find(|bike| bike.id == bike_id)
            .ok_or_else(|| ResolutionError::NotFound(bike_id.to_string()))?;

        if resolution.origin.is_cacheable() || resolution.origin == ProductOrigin::Cache {
            self.inner.cache.store_endpoint(&key, &bike).await;
        }
        Ok(bike)
    }

    /// Variations of one bike.
    ///
    /// Asks each live source in order; when none answers, falls back to the
    /// variations carried by the resolved catalogue.
    pub async fn variations_for(&self, bike_id: &str) -> Result<Vec<BikeVariation>, ResolutionError> {
        let key = format!("variations:{}", bike_id);
        if let Some(variations) = self.inner.cache.endpoint::<Vec<BikeVariation>>(&key).await {
            return Ok(variations);
        }

        let mut answered_empty = false;
        for source in &self.inner.sources {
            match source.fetch_variations(bike_id).await {
                Ok(variations) if !variations.is_empty() => {
                    self.inner.cache.store_endpoint(&key, &variations).await;
                    return Ok(variations);
                }
                Ok(_) => answered_empty = true,
                Err(SourceError::InvalidId(id)) => return Err(ResolutionError::NotFound(id)),
                Err(e) => tracing::warn!(
                    source = %source.origin(),
                    bike_id,
                    error = %e,
                    "Variation lookup failed"
                ),
            }
        }

        match self.find_bike(bike_id).await {
            Ok(bike) => Ok(bike.variations),
            Err(ResolutionError::NotFound(_)) if answered_empty => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Drops cached catalogue data; the fallback snapshot is kept.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate_products().await;
    }
}

impl ResolverInner {
    /// Joins the resolution in flight or starts one.
    async fn run_shared(inner: &Arc<Self>) -> Result<Resolution, ResolutionError> {
        let pending = {
            let mut slot = inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(pending) => {
                    tracing::debug!("Joining product resolution in flight");
                    pending.clone()
                }
                None => {
                    let owner = inner.clone();
                    let pending = async move {
                        let result = owner.walk_tiers().await;
                        owner
                            .in_flight
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .take();
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    async fn walk_tiers(&self) -> Result<Resolution, ResolutionError> {
        let mut attempts = Vec::new();

        for source in &self.sources {
            let origin = source.origin();
            match source.fetch_all().await {
                Ok(products) if !products.is_empty() => {
                    self.cache.store_products(&products).await;
                    tracing::info!(source = %origin, count = products.len(), "Products resolved");
                    return Ok(Resolution {
                        products,
                        origin,
                        attempts,
                    });
                }
                Ok(_) => {
                    tracing::debug!(source = %origin, "Product source returned nothing");
                    attempts.push(TierAttempt {
                        origin,
                        outcome: "empty".to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(source = %origin, error = %e, "Product source failed");
                    attempts.push(TierAttempt {
                        origin,
                        outcome: e.to_string(),
                    });
                }
            }
        }

        if let Some(entry) = self.cache.fallback_products().await {
            if !entry.payload.is_empty() {
                tracing::warn!(count = entry.payload.len(), "Serving fallback product snapshot");
                return Ok(Resolution {
                    products: entry.payload,
                    origin: ProductOrigin::FallbackCache,
                    attempts,
                });
            }
        }

        match self.last_resort.fetch_all().await {
            Ok(products) => {
                tracing::warn!(
                    source = %self.last_resort.origin(),
                    count = products.len(),
                    "Serving last-resort catalogue"
                );
                Ok(Resolution {
                    products,
                    origin: self.last_resort.origin(),
                    attempts,
                })
            }
            Err(last) => {
                tracing::error!(error = %last, "Last-resort product source failed");
                Err(ResolutionError::Exhausted { attempts, last })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::{CacheSettings, InMemoryStore};
    use crate::adapters::sources::StaticSource;
    use crate::domain::catalog::static_bikes;
    use crate::domain::resilience::{Dependency, TransportError};
    use crate::ports::ManualClock;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Source returning a fixed answer and counting calls.
    struct FixedSource {
        origin: ProductOrigin,
        answer: Result<Vec<Bike>, SourceError>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl FixedSource {
        fn ok(origin: ProductOrigin, bikes: Vec<Bike>) -> Arc<Self> {
            Arc::new(Self {
                origin,
                answer: Ok(bikes),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            })
        }

        fn failing(origin: ProductOrigin) -> Arc<Self> {
            Arc::new(Self {
                origin,
                answer: Err(TransportError::network(Dependency::Functions, "down").into()),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProductSource for FixedSource {
        fn origin(&self) -> ProductOrigin {
            self.origin
        }

        async fn fetch_all(&self) -> Result<Vec<Bike>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer.clone()
        }

        async fn fetch_variations(&self, bike_id: &str) -> Result<Vec<BikeVariation>, SourceError> {
            match &self.answer {
                Ok(bikes) => bikes
                    .iter()
                    .find(|bike| bike.id == bike_id)
                    .map(|bike| bike.variations.clone())
                    .ok_or_else(|| SourceError::NotFound(bike_id.to_string())),
                Err(e) => Err(e.clone()),
            }
        }
    }

    fn two_bikes() -> Vec<Bike> {
        static_bikes().into_iter().take(2).collect()
    }

    fn resolver(sources: Vec<Arc<dyn ProductSource>>) -> (ProductResolver, Arc<InstantCache>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::frozen());
        let cache = Arc::new(InstantCache::new(
            Arc::new(InMemoryStore::new()),
            clock.clone(),
            CacheSettings::default(),
        ));
        let resolver = ProductResolver::new(cache.clone(), sources, Arc::new(StaticSource));
        (resolver, cache, clock)
    }

    // ─── Tier Order Tests ───────────────────────────────────────────

    #[tokio::test]
    async fn first_answering_tier_wins_and_fills_cache() {
        let primary = FixedSource::failing(ProductOrigin::DatabaseFunction);
        let direct = FixedSource::ok(ProductOrigin::DirectDatabase, two_bikes());
        let commerce = FixedSource::ok(ProductOrigin::CommerceApi, static_bikes());
        let (resolver, cache, _) = resolver(vec![primary.clone(), direct.clone(), commerce.clone()]);

        let resolution = resolver.resolve().await.unwrap();
        assert_eq!(resolution.origin, ProductOrigin::DirectDatabase);
        assert_eq!(resolution.products.len(), 2);
        assert_eq!(resolution.attempts.len(), 1);
        assert_eq!(commerce.calls(), 0, "later tiers are not consulted");

        assert_eq!(cache.products().await.unwrap().payload.len(), 2);
        assert_eq!(cache.fallback_products().await.unwrap().payload.len(), 2);
    }

    #[tokio::test]
    async fn empty_tier_falls_through() {
        let primary = FixedSource::ok(ProductOrigin::DatabaseFunction, Vec::new());
        let commerce = FixedSource::ok(ProductOrigin::CommerceApi, two_bikes());
        let (resolver, _, _) = resolver(vec![primary, commerce]);

        let resolution = resolver.resolve().await.unwrap();
        assert_eq!(resolution.origin, ProductOrigin::CommerceApi);
        assert_eq!(resolution.attempts[0].outcome, "empty");
    }

    #[tokio::test]
    async fn static_catalogue_when_everything_fails() {
        let (resolver, cache, _) = resolver(vec![FixedSource::failing(ProductOrigin::CommerceApi)]);

        let resolution = resolver.resolve().await.unwrap();
        assert_eq!(resolution.origin, ProductOrigin::Static);
        assert!(resolution.is_degraded());
        assert!(!resolution.products.is_empty());
        assert!(cache.products().await.is_none(), "static data is not cached");
    }

    // ─── Cache Tests ────────────────────────────────────────────────

    #[tokio::test]
    async fn fresh_cache_short_circuits_sources() {
        let source = FixedSource::ok(ProductOrigin::DatabaseFunction, two_bikes());
        let (resolver, _, _) = resolver(vec![source.clone()]);

        resolver.resolve().await.unwrap();
        let second = resolver.resolve().await.unwrap();
        assert_eq!(second.origin, ProductOrigin::Cache);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn stale_cache_is_served_and_refreshed_in_background() {
        let source = FixedSource::ok(ProductOrigin::DatabaseFunction, two_bikes());
        let (resolver, _, clock) = resolver(vec![source.clone()]);

        resolver.resolve().await.unwrap();
        clock.advance(Duration::from_secs(150));

        let stale = resolver.resolve().await.unwrap();
        assert_eq!(stale.origin, ProductOrigin::Cache);

        for _ in 0..50 {
            if source.calls() == 2 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_next_resolution_to_sources() {
        let source = FixedSource::ok(ProductOrigin::DatabaseFunction, two_bikes());
        let (resolver, _, _) = resolver(vec![source.clone()]);

        resolver.resolve().await.unwrap();
        resolver.invalidate().await;
        let again = resolver.resolve().await.unwrap();
        assert_eq!(again.origin, ProductOrigin::DatabaseFunction);
        assert_eq!(source.calls(), 2);
    }

    // ─── Reentrancy Tests ───────────────────────────────────────────

    #[tokio::test]
    async fn concurrent_callers_share_one_walk() {
        let source = Arc::new(FixedSource {
            origin: ProductOrigin::DatabaseFunction,
            answer: Ok(two_bikes()),
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(20),
        });
        let (resolver, _, _) = resolver(vec![source.clone()]);

        let (a, b) = tokio::join!(resolver.refresh(), resolver.refresh());
        assert_eq!(a.unwrap().products.len(), 2);
        assert_eq!(b.unwrap().products.len(), 2);
        assert_eq!(source.calls(), 1);
    }

    // ─── Lookup Tests ───────────────────────────────────────────────

    #[tokio::test]
    async fn find_bike_and_filter_for_sale() {
        let mut bikes = two_bikes();
        bikes[1].available_quantity = 0;
        let id = bikes[0].id.clone();
        let (resolver, _, _) = resolver(vec![FixedSource::ok(ProductOrigin::CommerceApi, bikes)]);

        assert_eq!(resolver.find_bike(&id).await.unwrap().id, id);
        assert!(matches!(
            resolver.find_bike("nope").await,
            Err(ResolutionError::NotFound(_))
        ));
        assert_eq!(resolver.resolve_for_sale().await.unwrap().products.len(), 1);
    }

    #[tokio::test]
    async fn variations_fall_back_to_catalogue() {
        let (resolver, _, _) = resolver(vec![FixedSource::failing(ProductOrigin::CommerceApi)]);
        let bike = static_bikes().remove(0);
        let variations = resolver.variations_for(&bike.id).await.unwrap();
        assert_eq!(variations, bike.variations);
    }
}
