//! Repository Traits
//!
//! The atomic store capability. Implementations are in the infra layer.

use crate::domain::entities::Bucket;
use crate::domain::value_objects::{BucketKey, ConsumeArgs, ConsumeOutcome};
use crate::error::SentinelResult;

/// Store able to run the consume operation atomically per key
///
/// `consume` must run [`crate::domain::services::evaluate`] and persist its
/// result without any other operation on the same key observing or
/// interleaving with the read-modify-write.
#[trait_variant::make(BucketStore: Send)]
pub trait LocalBucketStore {
    /// Atomically refill, decide and persist. Reports whether the cost was taken
    /// and the instant the bucket was evaluated at.
    async fn consume(
        &self,
        key: &BucketKey,
        args: &ConsumeArgs,
    ) -> SentinelResult<ConsumeOutcome>;

    /// Read a bucket without mutating it
    async fn peek(&self, key: &BucketKey) -> SentinelResult<Option<Bucket>>;

    /// Delete records idle past their expiry. Returns the number removed.
    async fn purge_idle(&self, now_s: i64) -> SentinelResult<u64>;
}
