//! SyncService - Periodic catalogue copy from the commerce API into the
//! product database.
//!
//! ## Run Cycle
//!
//! 1. Skip when connectivity is unhealthy or the commerce circuit is open.
//!    A skipped run is not queued; the next tick tries again.
//! 2. Pull every product in the rental category, then variations for the
//!    variable ones.
//! 3. Upsert each product with its variations.
//! 4. Invalidate the read caches so the next resolution sees fresh rows.
//!
//! ## Graceful Shutdown
//!
//! `run` listens on a watch channel and exits between runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time;
use uuid::Uuid;

use crate::adapters::resilience::ResilienceContext;
use crate::application::ProductResolver;
use crate::domain::foundation::Timestamp;
use crate::domain::resilience::{Dependency, TransportError};
use crate::ports::{Clock, CommerceApi, ProductDatabase, ProductQuery};

/// Configuration for the SyncService.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub interval: Duration,
    pub category: String,
    pub page_size: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(900),
            category: "rentals".to_string(),
            page_size: 100,
        }
    }
}

/// Why a run did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Unhealthy,
    CircuitOpen,
    AlreadyRunning,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Unhealthy => "connectivity unhealthy",
            SkipReason::CircuitOpen => "commerce circuit open",
            SkipReason::AlreadyRunning => "sync already running",
        }
    }
}

/// Counts from a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub products: usize,
    pub variations: usize,
    pub failed: usize,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Skipped { reason: SkipReason },
    Completed(SyncReport),
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("could not prepare product tables: {0}")]
    Schema(TransportError),

    #[error("could not fetch products from commerce: {0}")]
    Fetch(TransportError),
}

/// Holds the single-run flag; cleared on drop, including when the run's
/// future is cancelled mid-way.
struct RunningFlag<'a>(&'a AtomicBool);

impl<'a> RunningFlag<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SyncService {
    commerce: Arc<dyn CommerceApi>,
    database: Arc<dyn ProductDatabase>,
    resolver: ProductResolver,
    resilience: Arc<ResilienceContext>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
    running: AtomicBool,
    schema_ready: AtomicBool,
}

impl SyncService {
    pub fn new(
        commerce: Arc<dyn CommerceApi>,
        database: Arc<dyn ProductDatabase>,
        resolver: ProductResolver,
        resilience: Arc<ResilienceContext>,
        clock: Arc<dyn Clock>,
        config: SyncConfig,
    ) -> Self {
        Self {
            commerce,
            database,
            resolver,
            resilience,
            clock,
            config,
            running: AtomicBool::new(false),
            schema_ready: AtomicBool::new(false),
        }
    }

    /// Runs a sync every interval until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Sync loop stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    match self.sync_once().await {
                        Ok(SyncOutcome::Skipped { reason }) => {
                            tracing::info!(reason = reason.as_str(), "Sync skipped");
                        }
                        Ok(SyncOutcome::Completed(report)) => {
                            tracing::info!(
                                run_id = %report.run_id,
                                products = report.products,
                                variations = report.variations,
                                failed = report.failed,
                                "Sync completed"
                            );
                        }
                        Err(e) => tracing::warn!(error = %e, "Sync failed"),
                    }
                }
            }
        }
    }

    /// One sync run. Also used by the manual trigger endpoint.
    pub async fn sync_once(&self) -> Result<SyncOutcome, SyncError> {
        if let Some(reason) = self.skip_reason() {
            return Ok(SyncOutcome::Skipped { reason });
        }
        let Some(_running) = RunningFlag::acquire(&self.running) else {
            return Ok(SyncOutcome::Skipped {
                reason: SkipReason::AlreadyRunning,
            });
        };

        self.copy_catalogue().await.map(SyncOutcome::Completed)
    }

    fn skip_reason(&self) -> Option<SkipReason> {
        if !self.resilience.is_healthy() {
            Some(SkipReason::Unhealthy)
        } else if self.resilience.is_open(Dependency::Commerce) {
            Some(SkipReason::CircuitOpen)
        } else {
            None
        }
    }

    async fn copy_catalogue(&self) -> Result<SyncReport, SyncError> {
        let run_id = Uuid::new_v4();
        let started_at = self.clock.now();
        tracing::info!(%run_id, "Sync started");

        if !self.schema_ready.load(Ordering::SeqCst) {
            self.database
                .create_table_if_missing()
                .await
                .map_err(SyncError::Schema)?;
            self.schema_ready.store(true, Ordering::SeqCst);
        }

        let query = ProductQuery::default()
            .in_category(self.config.category.clone())
            .with_page_size(self.config.page_size);
        let products = self
            .commerce
            .list_all_products(&query)
            .await
            .map_err(SyncError::Fetch)?;

        let mut report = SyncReport {
            run_id,
            products: 0,
            variations: 0,
            failed: 0,
            started_at,
            finished_at: started_at,
        };

        for product in &products {
            let variations = if product.is_variable() {
                match self.commerce.list_variations(product.id).await {
                    Ok(variations) => variations,
                    Err(e) => {
                        // Upserting without variations would wipe the stored ones.
                        tracing::warn!(product_id = product.id, error = %e, "Skipping product, variations unavailable");
                        report.failed += 1;
                        continue;
                    }
                }
            } else {
                Vec::new()
            };

            match self.database.upsert_product(product, &variations).await {
                Ok(()) => {
                    report.products += 1;
                    report.variations += variations.len();
                }
                Err(e) => {
                    tracing::warn!(product_id = product.id, error = %e, "Product upsert failed");
                    report.failed += 1;
                }
            }
        }

        self.resolver.invalidate().await;
        report.finished_at = self.clock.now();
        Ok(report)
    }
}
