//! Domain Entities
//!
//! Core business entities for the admission domain.

use crate::domain::value_objects::BucketKey;
use platform::rate_limit::BucketState;

/// Persisted token bucket record
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub key: BucketKey,
    pub tokens: f64,
    pub last_refill_s: i64,
    /// Store-level idle expiry; the record may be purged after this instant
    pub expires_at_s: i64,
}

impl Bucket {
    pub fn new(key: BucketKey, state: BucketState, expires_at_s: i64) -> Self {
        Self {
            key,
            tokens: state.tokens,
            last_refill_s: state.last_refill_s,
            expires_at_s,
        }
    }

    pub fn state(&self) -> BucketState {
        BucketState {
            tokens: self.tokens,
            last_refill_s: self.last_refill_s,
        }
    }

    /// Check if the record outlived its idle expiry
    pub fn is_expired(&self, now_s: i64) -> bool {
        now_s >= self.expires_at_s
    }
}
