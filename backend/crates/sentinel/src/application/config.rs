//! Application Configuration
//!
//! Configuration for the admission application layer.

use crate::domain::value_objects::BucketKey;
use platform::rate_limit::full_refill_secs;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// What to answer when the bucket store cannot be consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Deny while the store is down
    Closed,
    /// Admit while the store is down; buckets are not charged
    Open,
}

/// Where `now` comes from when a bucket is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// The admitting process's wall clock
    Caller,
    /// The store's own clock (PostgreSQL `now()`)
    Store,
}

#[derive(Debug, Clone, Error)]
#[error("Unknown {setting} value: {value}")]
pub struct ParseConfigError {
    pub setting: &'static str,
    pub value: String,
}

impl FromStr for FailurePolicy {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closed" | "fail-closed" => Ok(FailurePolicy::Closed),
            "open" | "fail-open" => Ok(FailurePolicy::Open),
            _ => Err(ParseConfigError {
                setting: "failure policy",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for ClockSource {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "caller" => Ok(ClockSource::Caller),
            "store" => Ok(ClockSource::Store),
            _ => Err(ParseConfigError {
                setting: "clock source",
                value: s.to_string(),
            }),
        }
    }
}

/// Admission application configuration
#[derive(Debug, Clone)]
pub struct SentinelConfig {
    /// Prefix prepended to identifiers to form store keys
    pub key_prefix: String,
    /// Identifier used when the caller sends none
    pub default_identifier: String,
    /// Policy used when the caller omits a parameter
    pub default_capacity: i64,
    pub default_refill_rate: f64,
    pub default_cost: i64,
    /// Deadline for one atomic store operation
    pub store_timeout: Duration,
    /// Idle lifetime of a bucket record after its last write
    pub idle_ttl: Duration,
    pub failure_policy: FailurePolicy,
    pub clock_source: ClockSource,
    /// Answer 503 instead of applying the failure policy at the HTTP layer
    pub surface_store_errors: bool,
    /// How often idle buckets are purged
    pub purge_interval: Duration,
    /// Buffer size of the admission event channel
    pub event_buffer: usize,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            key_prefix: BucketKey::DEFAULT_PREFIX.to_string(),
            default_identifier: "guest".to_string(),
            default_capacity: 10,
            default_refill_rate: 1.0,
            default_cost: 1,
            store_timeout: Duration::from_millis(500),
            idle_ttl: Duration::from_secs(3600),
            failure_policy: FailurePolicy::Closed,
            clock_source: ClockSource::Caller,
            surface_store_errors: false,
            purge_interval: Duration::from_secs(300),
            event_buffer: 1024,
        }
    }
}

impl SentinelConfig {
    /// Create config for development (generous store deadline, errors surfaced)
    pub fn development() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            surface_store_errors: true,
            ..Self::default()
        }
    }

    pub fn store_timeout_ms(&self) -> u64 {
        self.store_timeout.as_millis() as u64
    }

    pub fn idle_ttl_secs(&self) -> i64 {
        i64::try_from(self.idle_ttl.as_secs()).unwrap_or(i64::MAX)
    }

    /// Warn about settings that silently lose accrued bucket history.
    ///
    /// Returns `false` when the idle TTL is shorter than a full refill of
    /// the default policy.
    pub fn validate(&self) -> bool {
        match full_refill_secs(self.default_capacity as f64, self.default_refill_rate) {
            Some(refill_secs) if refill_secs > self.idle_ttl.as_secs() => {
                tracing::warn!(
                    idle_ttl_secs = self.idle_ttl.as_secs(),
                    full_refill_secs = refill_secs,
                    "Idle TTL is shorter than a full refill; idle buckets will reset early"
                );
                false
            }
            _ => true,
        }
    }
}
