//! HTTP Handlers

use crate::application::check_admission::{AdmissionDecision, CheckAdmissionUseCase};
use crate::application::config::SentinelConfig;
use crate::application::events::EventPublisher;
use crate::domain::repository::BucketStore;
use crate::domain::value_objects::AdmissionRequest;
use crate::error::{SentinelError, SentinelResult};
use crate::presentation::dto::{CheckQuery, CheckResponse};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use platform::client::extract_identifier;
use platform::rate_limit::Clock;
use std::sync::Arc;

/// Shared state for admission handlers
pub struct SentinelAppState<S>
where
    S: BucketStore + Send + Sync + 'static,
{
    pub store: Arc<S>,
    pub config: Arc<SentinelConfig>,
    pub clock: Arc<dyn Clock>,
    pub events: EventPublisher,
}

impl<S> Clone for SentinelAppState<S>
where
    S: BucketStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            clock: self.clock.clone(),
            events: self.events.clone(),
        }
    }
}

/// GET /api/rate-limit/check
pub async fn check_rate_limit<S>(
    State(state): State<SentinelAppState<S>>,
    headers: HeaderMap,
    Query(query): Query<CheckQuery>,
) -> SentinelResult<(StatusCode, Json<CheckResponse>)>
where
    S: BucketStore + Send + Sync + 'static,
{
    let config = &state.config;
    let identifier = extract_identifier(&headers, &config.default_identifier)?;

    let request = AdmissionRequest::new(
        identifier,
        query.capacity.unwrap_or(config.default_capacity),
        query.rate.unwrap_or(config.default_refill_rate),
        query.cost.unwrap_or(config.default_cost),
    )?;

    let use_case = CheckAdmissionUseCase::new(state.store.clone(), state.config.clone())
        .with_clock(state.clock.clone())
        .with_events(state.events.clone());

    let decision = use_case.execute(&request).await;

    if matches!(decision, AdmissionDecision::Unavailable { .. }) && config.surface_store_errors {
        return Err(SentinelError::StoreUnavailable(
            "admission decision could not be made".to_string(),
        ));
    }

    let allowed = decision.allowed();
    let status = if allowed {
        StatusCode::OK
    } else {
        StatusCode::TOO_MANY_REQUESTS
    };

    Ok((status, Json(CheckResponse { allowed })))
}
