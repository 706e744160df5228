//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::Context;
use axum::Router;
use platform::rate_limit::{Clock, SystemClock};
use sentinel::{
    BucketStore, ClockSource, EventPublisher, FailurePolicy, PgBucketStore, SentinelConfig,
    sentinel_router,
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

/// Read an optional environment variable, parsing it when present
fn env_parse<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{name}: {e}")),
        _ => Ok(None),
    }
}

fn load_config() -> anyhow::Result<SentinelConfig> {
    let mut config = if cfg!(debug_assertions) {
        SentinelConfig::development()
    } else {
        SentinelConfig::default()
    };

    if let Some(prefix) = env_parse::<String>("SENTINEL_KEY_PREFIX")? {
        config.key_prefix = prefix;
    }
    if let Some(ms) = env_parse::<u64>("SENTINEL_STORE_TIMEOUT_MS")? {
        config.store_timeout = Duration::from_millis(ms);
    }
    if let Some(secs) = env_parse::<u64>("SENTINEL_IDLE_TTL_SECS")? {
        config.idle_ttl = Duration::from_secs(secs);
    }
    if let Some(policy) = env_parse::<FailurePolicy>("SENTINEL_FAILURE_POLICY")? {
        config.failure_policy = policy;
    }
    if let Some(clock) = env_parse::<ClockSource>("SENTINEL_CLOCK")? {
        config.clock_source = clock;
    }
    if let Some(surface) = env_parse::<bool>("SENTINEL_SURFACE_STORE_ERRORS")? {
        config.surface_store_errors = surface;
    }
    if let Some(secs) = env_parse::<u64>("SENTINEL_PURGE_INTERVAL_SECS")? {
        config.purge_interval = Duration::from_secs(secs.max(1));
    }

    Ok(config)
}

async fn purge_idle_buckets(store: &PgBucketStore) {
    let now_s = SystemClock.now_secs();
    match store.purge_idle(now_s).await {
        Ok(deleted) => {
            tracing::info!(buckets_deleted = deleted, "Idle bucket purge completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Idle bucket purge failed, continuing anyway");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,sentinel=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    config.validate();
    tracing::info!(
        failure_policy = ?config.failure_policy,
        clock_source = ?config.clock_source,
        store_timeout_ms = config.store_timeout_ms(),
        idle_ttl_secs = config.idle_ttl_secs(),
        "Admission configuration loaded"
    );

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let store = PgBucketStore::new(pool.clone());

    // Startup cleanup: remove idle buckets
    // Errors here should not prevent server startup
    purge_idle_buckets(&store).await;

    let purge_store = store.clone();
    let purge_interval = config.purge_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(purge_interval);
        // The first tick completes immediately; startup already purged
        ticker.tick().await;
        loop {
            ticker.tick().await;
            purge_idle_buckets(&purge_store).await;
        }
    });

    // Admission event feed
    let events = EventPublisher::new(config.event_buffer);
    let mut feed = events.subscribe();
    tokio::spawn(async move {
        use tokio::sync::broadcast::error::RecvError;
        loop {
            match feed.recv().await {
                Ok(event) => {
                    tracing::debug!(
                        identifier = %event.identifier,
                        allowed = event.allowed,
                        decided_at = %event.decided_at,
                        "Admission decision"
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Admission event feed lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Build router
    let app = Router::new()
        .nest("/api/rate-limit", sentinel_router(store, config, events))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = env_parse("SENTINEL_BIND_ADDR")?
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 31113)));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
