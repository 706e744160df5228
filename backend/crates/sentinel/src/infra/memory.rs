//! In-memory Bucket Store
//!
//! Single-process store. The mutex section plays the role of the
//! atomic store operation; it is never held across an await.

use crate::domain::entities::Bucket;
use crate::domain::repository::BucketStore;
use crate::domain::services::evaluate;
use crate::domain::value_objects::{BucketKey, ConsumeArgs, ConsumeOutcome};
use crate::error::{SentinelError, SentinelResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Default)]
pub struct MemoryBucketStore {
    buckets: Arc<Mutex<HashMap<BucketKey, Bucket>>>,
}

impl MemoryBucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, replacing any existing one
    pub fn restore(&self, bucket: Bucket) -> SentinelResult<()> {
        self.lock()?.insert(bucket.key.clone(), bucket);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> SentinelResult<MutexGuard<'_, HashMap<BucketKey, Bucket>>> {
        self.buckets
            .lock()
            .map_err(|_| SentinelError::StoreUnavailable("bucket map poisoned".to_string()))
    }
}

impl BucketStore for MemoryBucketStore {
    async fn consume(
        &self,
        key: &BucketKey,
        args: &ConsumeArgs,
    ) -> SentinelResult<ConsumeOutcome> {
        let mut buckets = self.lock()?;

        let stored = buckets
            .get(key)
            .filter(|b| !b.is_expired(args.now_s))
            .map(Bucket::state);
        let eval = evaluate(stored, args);

        if eval.reinitialized {
            tracing::warn!(bucket = %key, "Malformed bucket state, re-initialized");
        }

        buckets.insert(
            key.clone(),
            Bucket::new(key.clone(), eval.state, eval.expires_at_s),
        );

        Ok(ConsumeOutcome {
            allowed: eval.allowed,
            evaluated_at_s: args.now_s,
        })
    }

    async fn peek(&self, key: &BucketKey) -> SentinelResult<Option<Bucket>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn purge_idle(&self, now_s: i64) -> SentinelResult<u64> {
        let mut buckets = self.lock()?;
        let before = buckets.len();
        buckets.retain(|_, b| !b.is_expired(now_s));
        let deleted = (before - buckets.len()) as u64;

        tracing::debug!(buckets = deleted, "Purged idle buckets");

        Ok(deleted)
    }
}
