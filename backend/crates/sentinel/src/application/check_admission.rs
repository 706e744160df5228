//! Check Admission Use Case
//!
//! Stateless façade over the bucket store: one call, at most one atomic
//! store mutation, always a decision.

use crate::application::config::{FailurePolicy, SentinelConfig};
use crate::application::events::{AdmissionEvent, EventPublisher};
use crate::domain::repository::BucketStore;
use crate::domain::value_objects::{AdmissionRequest, BucketKey, ConsumeArgs};
use crate::error::SentinelError;
use platform::rate_limit::{Clock, SystemClock};
use std::sync::Arc;

/// Result of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Cost deducted from the bucket
    Admitted,
    /// Not enough tokens; refill was still persisted
    Denied,
    /// Cost exceeds capacity; the store was not touched
    Rejected,
    /// Store could not be consulted; `allowed` follows the failure policy
    Unavailable { allowed: bool },
}

impl AdmissionDecision {
    pub fn allowed(&self) -> bool {
        match self {
            AdmissionDecision::Admitted => true,
            AdmissionDecision::Denied | AdmissionDecision::Rejected => false,
            AdmissionDecision::Unavailable { allowed } => *allowed,
        }
    }
}

/// Check Admission Use Case
pub struct CheckAdmissionUseCase<S>
where
    S: BucketStore,
{
    store: Arc<S>,
    config: Arc<SentinelConfig>,
    clock: Arc<dyn Clock>,
    events: Option<EventPublisher>,
}

impl<S> CheckAdmissionUseCase<S>
where
    S: BucketStore,
{
    pub fn new(store: Arc<S>, config: Arc<SentinelConfig>) -> Self {
        Self {
            store,
            config,
            clock: Arc::new(SystemClock),
            events: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_events(mut self, events: EventPublisher) -> Self {
        self.events = Some(events);
        self
    }

    /// Boolean contract: never fails, invalid input is a denial
    pub async fn is_allowed(
        &self,
        identifier: &str,
        capacity: i64,
        refill_rate: f64,
        cost: i64,
    ) -> bool {
        match AdmissionRequest::new(identifier, capacity, refill_rate, cost) {
            Ok(request) => self.execute(&request).await.allowed(),
            Err(e) => {
                e.log();
                false
            }
        }
    }

    pub async fn execute(&self, request: &AdmissionRequest) -> AdmissionDecision {
        if request.is_oversized() {
            tracing::warn!(
                identifier = %request.identifier,
                cost = request.cost,
                capacity = request.capacity,
                "Request denied: cost exceeds bucket capacity"
            );
            return AdmissionDecision::Rejected;
        }

        let key = BucketKey::new(&self.config.key_prefix, &request.identifier);
        let now_s = self.clock.now_secs();
        let args = ConsumeArgs::from_request(request, now_s, self.config.idle_ttl_secs());

        let result =
            match tokio::time::timeout(self.config.store_timeout, self.store.consume(&key, &args))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(SentinelError::StoreTimeout(self.config.store_timeout_ms())),
            };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                e.log();
                let allowed = self.config.failure_policy == FailurePolicy::Open;
                tracing::warn!(
                    identifier = %request.identifier,
                    allowed,
                    "Bucket store failed, applying failure policy"
                );
                return AdmissionDecision::Unavailable { allowed };
            }
        };

        let decision = if outcome.allowed {
            AdmissionDecision::Admitted
        } else {
            tracing::debug!(
                identifier = %request.identifier,
                cost = request.cost,
                "Rate limit exceeded"
            );
            AdmissionDecision::Denied
        };

        if let Some(events) = &self.events {
            events.publish(AdmissionEvent::new(
                request.identifier.clone(),
                decision.allowed(),
                outcome.evaluated_at_s,
            ));
        }

        decision
    }
}
