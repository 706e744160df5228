//! Sentinel Router

use crate::application::config::{ClockSource, SentinelConfig};
use crate::application::events::EventPublisher;
use crate::domain::repository::BucketStore;
use crate::infra::postgres::PgBucketStore;
use crate::presentation::handlers::{self, SentinelAppState};
use axum::{Router, routing::get};
use platform::rate_limit::{Clock, SystemClock};
use std::sync::Arc;

/// Create the admission router with the PostgreSQL store.
///
/// `config.clock_source` decides whether buckets are evaluated at the
/// database's clock or at this process's clock.
pub fn sentinel_router(
    store: PgBucketStore,
    config: SentinelConfig,
    events: EventPublisher,
) -> Router {
    let store = configure_store(store, &config);
    sentinel_router_generic(store, config, events, Arc::new(SystemClock))
}

fn configure_store(store: PgBucketStore, config: &SentinelConfig) -> PgBucketStore {
    store.with_store_clock(config.clock_source == ClockSource::Store)
}

/// Create an admission router for any store implementation
pub fn sentinel_router_generic<S>(
    store: S,
    config: SentinelConfig,
    events: EventPublisher,
    clock: Arc<dyn Clock>,
) -> Router
where
    S: BucketStore + Send + Sync + 'static,
{
    let state = SentinelAppState {
        store: Arc::new(store),
        config: Arc::new(config),
        clock,
        events,
    };

    Router::new()
        .route("/check", get(handlers::check_rate_limit::<S>))
        .with_state(state)
}
