//! Domain Value Objects
//!
//! Immutable value types for the admission domain.

use crate::error::{SentinelError, SentinelResult};
use std::fmt;

/// Store key of a bucket, `<prefix><identifier>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey(String);

impl BucketKey {
    pub const DEFAULT_PREFIX: &'static str = "rate_limit:";

    pub fn new(prefix: &str, identifier: &str) -> Self {
        Self(format!("{prefix}{identifier}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transient request descriptor: who is asking and under which policy
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionRequest {
    pub identifier: String,
    pub capacity: u32,
    /// Tokens added per second
    pub refill_rate: f64,
    pub cost: u32,
}

impl AdmissionRequest {
    /// Validate raw transport values.
    ///
    /// `cost > capacity` is accepted here; it is a deterministic denial,
    /// not a malformed request.
    pub fn new(
        identifier: impl Into<String>,
        capacity: i64,
        refill_rate: f64,
        cost: i64,
    ) -> SentinelResult<Self> {
        let identifier = identifier.into();
        if identifier.is_empty() {
            return Err(SentinelError::InvalidParameter(
                "identifier must not be empty".to_string(),
            ));
        }
        let capacity = u32::try_from(capacity)
            .ok()
            .filter(|c| *c > 0)
            .ok_or_else(|| {
                SentinelError::InvalidParameter(format!(
                    "capacity must be a positive integer, got {capacity}"
                ))
            })?;
        if !refill_rate.is_finite() || refill_rate < 0.0 {
            return Err(SentinelError::InvalidParameter(format!(
                "rate must be a finite number >= 0, got {refill_rate}"
            )));
        }
        let cost = u32::try_from(cost)
            .ok()
            .filter(|c| *c >= 1)
            .ok_or_else(|| {
                SentinelError::InvalidParameter(format!("cost must be at least 1, got {cost}"))
            })?;

        Ok(Self {
            identifier,
            capacity,
            refill_rate,
            cost,
        })
    }

    /// No amount of refill can ever satisfy this request
    pub fn is_oversized(&self) -> bool {
        self.cost > self.capacity
    }
}

/// Arguments of one atomic consume operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumeArgs {
    pub refill_rate: f64,
    pub capacity: f64,
    pub now_s: i64,
    pub cost: f64,
    /// Idle lifetime of the record after this write
    pub idle_ttl_s: i64,
}

impl ConsumeArgs {
    pub fn from_request(request: &AdmissionRequest, now_s: i64, idle_ttl_s: i64) -> Self {
        Self {
            refill_rate: request.refill_rate,
            capacity: f64::from(request.capacity),
            now_s,
            cost: f64::from(request.cost),
            idle_ttl_s,
        }
    }

    /// Same operation evaluated at another instant (store-side clock)
    pub fn at(self, now_s: i64) -> Self {
        Self { now_s, ..self }
    }
}

/// Result of one atomic consume operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumeOutcome {
    pub allowed: bool,
    /// Instant the bucket was evaluated at; the store's clock when it supplies one
    pub evaluated_at_s: i64,
}
