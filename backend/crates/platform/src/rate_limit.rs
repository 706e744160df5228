//! Rate Limiting Infrastructure
//!
//! Token bucket arithmetic and time sources shared by rate limiting backends.
//! Everything here is pure: no storage, no locking.

use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Slack applied to the admission comparison so that accumulated float error
/// (e.g. ten refills of 0.1) does not deny a request that should pass.
pub const TOKEN_EPSILON: f64 = 1e-9;

/// Source of epoch seconds
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Manually advanced clock for deterministic tests and simulations
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_secs: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_secs)),
        }
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, secs: i64) {
        self.now.store(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Token bucket snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketState {
    pub tokens: f64,
    pub last_refill_s: i64,
}

impl BucketState {
    /// A bucket that has never been touched
    pub fn full(capacity: f64, now_s: i64) -> Self {
        Self {
            tokens: capacity,
            last_refill_s: now_s,
        }
    }

    /// Whether the snapshot can be trusted as bucket state
    pub fn is_well_formed(&self) -> bool {
        self.tokens.is_finite() && self.tokens >= 0.0 && self.last_refill_s >= 0
    }

    /// Lazy refill up to `now_s`.
    ///
    /// A clock that runs behind `last_refill_s` yields zero elapsed time and
    /// keeps the later timestamp, so `last_refill_s` never moves backwards.
    pub fn refilled(self, capacity: f64, refill_rate: f64, now_s: i64) -> Self {
        let elapsed = now_s.saturating_sub(self.last_refill_s).max(0) as f64;
        let tokens = (self.tokens + elapsed * refill_rate).min(capacity).max(0.0);
        Self {
            tokens,
            last_refill_s: self.last_refill_s.max(now_s),
        }
    }

    /// Try to take `cost` tokens. Returns the new state and whether it succeeded.
    pub fn try_take(self, cost: f64) -> (Self, bool) {
        if self.tokens + TOKEN_EPSILON >= cost {
            let tokens = (self.tokens - cost).max(0.0);
            (Self { tokens, ..self }, true)
        } else {
            (self, false)
        }
    }
}

/// Seconds needed to refill an empty bucket of `capacity` at `refill_rate`.
///
/// `None` when the bucket never refills.
pub fn full_refill_secs(capacity: f64, refill_rate: f64) -> Option<u64> {
    if refill_rate > 0.0 && refill_rate.is_finite() {
        Some((capacity / refill_rate).ceil() as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refill_caps_at_capacity() {
        let state = BucketState {
            tokens: 2.0,
            last_refill_s: 100,
        };
        let refilled = state.refilled(10.0, 1.0, 1_000);
        assert_eq!(refilled.tokens, 10.0);
        assert_eq!(refilled.last_refill_s, 1_000);
    }

    #[test]
    fn test_refill_fractional_rate() {
        let state = BucketState {
            tokens: 0.0,
            last_refill_s: 0,
        };
        let refilled = state.refilled(10.0, 0.25, 3);
        assert!((refilled.tokens - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_refill_clock_behind_keeps_timestamp() {
        let state = BucketState {
            tokens: 3.0,
            last_refill_s: 500,
        };
        let refilled = state.refilled(10.0, 5.0, 400);
        assert_eq!(refilled.tokens, 3.0);
        assert_eq!(refilled.last_refill_s, 500);
    }

    #[test]
    fn test_refill_shrinks_to_smaller_capacity() {
        let state = BucketState {
            tokens: 50.0,
            last_refill_s: 10,
        };
        assert_eq!(state.refilled(10.0, 0.0, 10).tokens, 10.0);
    }

    #[test]
    fn test_try_take() {
        let state = BucketState::full(3.0, 0);
        let (state, ok) = state.try_take(2.0);
        assert!(ok);
        assert_eq!(state.tokens, 1.0);

        let (state, ok) = state.try_take(2.0);
        assert!(!ok);
        assert_eq!(state.tokens, 1.0);
    }

    #[test]
    fn test_try_take_absorbs_float_drift() {
        let mut state = BucketState {
            tokens: 0.0,
            last_refill_s: 0,
        };
        for t in 1..=10 {
            state = state.refilled(5.0, 0.1, t);
        }
        let (state, ok) = state.try_take(1.0);
        assert!(ok);
        assert!(state.tokens >= 0.0);
    }

    #[test]
    fn test_well_formed() {
        assert!(BucketState::full(1.0, 0).is_well_formed());
        assert!(
            !BucketState {
                tokens: f64::NAN,
                last_refill_s: 0
            }
            .is_well_formed()
        );
        assert!(
            !BucketState {
                tokens: -1.0,
                last_refill_s: 0
            }
            .is_well_formed()
        );
    }

    #[test]
    fn test_full_refill_secs() {
        assert_eq!(full_refill_secs(10.0, 1.0), Some(10));
        assert_eq!(full_refill_secs(10.0, 3.0), Some(4));
        assert_eq!(full_refill_secs(10.0, 0.0), None);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        clock.advance(5);
        assert_eq!(clock.now_secs(), 1_005);
        clock.set(7);
        assert_eq!(clock.now_secs(), 7);
    }
}
