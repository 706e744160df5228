//! Domain Services
//!
//! The token bucket engine. Pure: a store runs [`evaluate`] inside its
//! atomic section and persists the returned state.

use crate::domain::value_objects::ConsumeArgs;
use platform::rate_limit::BucketState;

/// Outcome of one consume step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// State to persist, whether or not the request was admitted
    pub state: BucketState,
    pub allowed: bool,
    /// Stored state was unreadable and has been replaced by a full bucket
    pub reinitialized: bool,
    pub expires_at_s: i64,
}

/// Refill, decide, and compute the next bucket state.
///
/// An absent bucket is a full bucket stamped `now`. A malformed one is
/// treated the same way and flagged.
pub fn evaluate(stored: Option<BucketState>, args: &ConsumeArgs) -> Evaluation {
    let fresh = BucketState::full(args.capacity, args.now_s);
    let (current, reinitialized) = match stored {
        Some(state) if state.is_well_formed() => (state, false),
        Some(_) => (fresh, true),
        None => (fresh, false),
    };

    let refilled = current.refilled(args.capacity, args.refill_rate, args.now_s);
    let (state, allowed) = refilled.try_take(args.cost);

    Evaluation {
        state,
        allowed,
        reinitialized,
        expires_at_s: state.last_refill_s.saturating_add(args.idle_ttl_s),
    }
}
