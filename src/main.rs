//! Rental booking API server.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rental_booking::adapters::cache::{InMemoryStore, InstantCache, RedisStore};
use rental_booking::adapters::commerce::{WooCommerceClient, WooCommerceConfig};
use rental_booking::adapters::crm::{CrmWebhookClient, NoopCrmNotifier};
use rental_booking::adapters::database::{FunctionDatabaseClient, PostgresProductDatabase};
use rental_booking::adapters::http::{api_router, AppState};
use rental_booking::adapters::resilience::ResilienceContext;
use rental_booking::adapters::sources::{CommerceSource, DatabaseSource, StaticSource};
use rental_booking::application::{self, ProductResolver, SubmitCheckoutHandler, SyncService};
use rental_booking::config::{AppConfig, ConfigError, ServerConfig, ValidationError};
use rental_booking::domain::resilience::Dependency;
use rental_booking::ports::{
    Clock, CommerceApi, CrmNotifier, KeyValueStore, ProductDatabase, ProductSource, SystemClock,
};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("could not create database pool: {0}")]
    Database(#[from] sqlx::Error),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        commerce = %config.commerce.base_url,
        "Starting rental booking API"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let http = reqwest::Client::builder()
        .user_agent(concat!("rental-booking/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut resilience = ResilienceContext::builder(clock.clone());
    for dependency in [
        Dependency::Commerce,
        Dependency::Functions,
        Dependency::Database,
        Dependency::Crm,
    ] {
        resilience = resilience.policy(dependency, config.dependency_policy(dependency));
    }
    let resilience = Arc::new(resilience.build());

    let store = build_store(&config).await;
    let cache = Arc::new(InstantCache::new(store, clock.clone(), config.cache.settings()));

    let commerce: Arc<dyn CommerceApi> = Arc::new(WooCommerceClient::new(
        WooCommerceConfig::new(
            config.commerce.base_url.clone(),
            config.commerce.consumer_key.clone(),
            config.commerce.consumer_secret.clone(),
        ),
        http.clone(),
        resilience.clone(),
    ));

    let function_db: Option<Arc<dyn ProductDatabase>> =
        config.database.function_url.as_ref().map(|url| {
            Arc::new(FunctionDatabaseClient::new(url.clone(), http.clone(), resilience.clone()))
                as Arc<dyn ProductDatabase>
        });

    let direct_db: Option<Arc<dyn ProductDatabase>> = match &config.database.url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(config.database.request_timeout())
                .connect_lazy(url)?;
            Some(Arc::new(PostgresProductDatabase::new(pool, resilience.clone()))
                as Arc<dyn ProductDatabase>)
        }
        None => None,
    };

    // Tier order: function endpoint, direct database, commerce API
    let mut sources: Vec<Arc<dyn ProductSource>> = Vec::new();
    if let Some(db) = &function_db {
        sources.push(Arc::new(DatabaseSource::function(db.clone())));
    }
    if let Some(db) = &direct_db {
        sources.push(Arc::new(DatabaseSource::direct(db.clone())));
    }
    sources.push(Arc::new(CommerceSource::new(
        commerce.clone(),
        config.commerce.rental_category.clone(),
        config.commerce.page_size,
    )));

    let resolver = ProductResolver::new(cache, sources, Arc::new(StaticSource));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sync = function_db.or(direct_db).map(|database| {
        Arc::new(SyncService::new(
            commerce.clone(),
            database,
            resolver.clone(),
            resilience.clone(),
            clock.clone(),
            application::SyncConfig {
                interval: config.sync.interval(),
                category: config.commerce.rental_category.clone(),
                page_size: config.commerce.page_size,
            },
        ))
    });

    match &sync {
        Some(service) if config.sync.enabled => {
            let service = service.clone();
            let shutdown = shutdown_rx.clone();
            tokio::spawn(async move { service.run(shutdown).await });
            tracing::info!(interval_secs = config.sync.interval_secs, "Product sync scheduled");
        }
        Some(_) => tracing::info!("Product sync disabled by configuration"),
        None => tracing::info!("No product database configured, sync unavailable"),
    }

    let crm: Arc<dyn CrmNotifier> = match &config.crm.webhook_url {
        Some(url) => {
            let mut client = CrmWebhookClient::new(url.clone(), http.clone(), resilience.clone());
            if let Some(secret) = &config.crm.signing_secret {
                client = client.with_signing_secret(secret.clone());
            }
            Arc::new(client)
        }
        None => {
            tracing::info!("CRM webhook not configured, notifications disabled");
            Arc::new(NoopCrmNotifier)
        }
    };

    let checkout = Arc::new(SubmitCheckoutHandler::new(
        commerce,
        crm,
        clock,
        config.checkout.settings(&config.commerce.base_url),
    ));

    // Warm the cache so the first visitor does not wait on the tier walk
    resolver.refresh_in_background();

    let state = AppState {
        resolver,
        checkout,
        sync,
        resilience,
    };
    let app = api_router(state, &config.server);

    let addr = config
        .server
        .socket_addr()
        .map_err(|_| ValidationError::InvalidHost)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Redis when configured and reachable, otherwise the in-process store.
async fn build_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    if let Some(url) = &config.cache.redis_url {
        match RedisStore::connect(url).await {
            Ok(store) => {
                tracing::info!("Using Redis cache store");
                return Arc::new(store);
            }
            Err(e) => tracing::warn!(error = %e, "Redis unavailable, using in-memory cache"),
        }
    }
    Arc::new(InMemoryStore::new())
}

/// Resolves on Ctrl-C or SIGTERM and tells background tasks to stop.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);
}
