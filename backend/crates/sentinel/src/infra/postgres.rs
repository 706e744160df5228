//! PostgreSQL Bucket Store
//!
//! One transaction per consume: seed the row if missing, take the row lock,
//! evaluate, write back. The row lock is the per-key serialization point.

use crate::domain::entities::Bucket;
use crate::domain::repository::BucketStore;
use crate::domain::services::{Evaluation, evaluate};
use crate::domain::value_objects::{BucketKey, ConsumeArgs, ConsumeOutcome};
use crate::error::SentinelResult;
use platform::rate_limit::BucketState;
use sqlx::PgPool;

/// PostgreSQL-backed bucket store
#[derive(Clone)]
pub struct PgBucketStore {
    pool: PgPool,
    store_clock: bool,
}

impl PgBucketStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            store_clock: false,
        }
    }

    /// Evaluate buckets at the database's `now()` instead of the caller's time
    pub fn with_store_clock(mut self, enabled: bool) -> Self {
        self.store_clock = enabled;
        self
    }

    pub fn uses_store_clock(&self) -> bool {
        self.store_clock
    }
}

impl BucketStore for PgBucketStore {
    async fn consume(
        &self,
        key: &BucketKey,
        args: &ConsumeArgs,
    ) -> SentinelResult<ConsumeOutcome> {
        let mut tx = self.pool.begin().await?;

        let store_now_s = if self.store_clock {
            let now_s = sqlx::query_scalar::<_, i64>(
                "SELECT FLOOR(EXTRACT(EPOCH FROM now()))::BIGINT",
            )
            .fetch_one(&mut *tx)
            .await?;
            Some(now_s)
        } else {
            None
        };
        let args = effective_args(args, store_now_s);
        let seed = BucketRow::seed(&args);

        // Concurrent first accesses both land here; ON CONFLICT makes the
        // loser wait for the winner's commit instead of failing.
        sqlx::query(
            r#"
            INSERT INTO rate_limit_buckets (bucket_key, tokens, last_refill_s, expires_at_s)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (bucket_key) DO NOTHING
            "#,
        )
        .bind(key.as_str())
        .bind(seed.tokens)
        .bind(seed.last_refill_s)
        .bind(seed.expires_at_s)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, BucketRow>(
            r#"
            SELECT tokens, last_refill_s, expires_at_s
            FROM rate_limit_buckets
            WHERE bucket_key = $1
            FOR UPDATE
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let eval = evaluate_row(row.as_ref(), &args);

        if eval.reinitialized {
            tracing::warn!(bucket = %key, "Malformed bucket state, re-initialized");
        }

        sqlx::query(
            r#"
            INSERT INTO rate_limit_buckets (bucket_key, tokens, last_refill_s, expires_at_s)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (bucket_key) DO UPDATE SET
                tokens = EXCLUDED.tokens,
                last_refill_s = EXCLUDED.last_refill_s,
                expires_at_s = EXCLUDED.expires_at_s
            "#,
        )
        .bind(key.as_str())
        .bind(eval.state.tokens)
        .bind(eval.state.last_refill_s)
        .bind(eval.expires_at_s)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            bucket = %key,
            allowed = eval.allowed,
            tokens = eval.state.tokens,
            "Bucket consumed"
        );

        Ok(ConsumeOutcome {
            allowed: eval.allowed,
            evaluated_at_s: args.now_s,
        })
    }

    async fn peek(&self, key: &BucketKey) -> SentinelResult<Option<Bucket>> {
        let row = sqlx::query_as::<_, BucketRow>(
            r#"
            SELECT tokens, last_refill_s, expires_at_s
            FROM rate_limit_buckets
            WHERE bucket_key = $1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_bucket(key.clone())))
    }

    async fn purge_idle(&self, now_s: i64) -> SentinelResult<u64> {
        let deleted = sqlx::query("DELETE FROM rate_limit_buckets WHERE expires_at_s <= $1")
            .bind(now_s)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!(buckets = deleted, "Purged idle buckets");

        Ok(deleted)
    }
}

/// Arguments as evaluated inside the transaction
fn effective_args(args: &ConsumeArgs, store_now_s: Option<i64>) -> ConsumeArgs {
    match store_now_s {
        Some(now_s) => args.at(now_s),
        None => *args,
    }
}

/// Decide on the locked row; an expired row counts as absent
fn evaluate_row(row: Option<&BucketRow>, args: &ConsumeArgs) -> Evaluation {
    evaluate(row.and_then(|r| r.live_state(args.now_s)), args)
}

// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct BucketRow {
    tokens: f64,
    last_refill_s: i64,
    expires_at_s: i64,
}

impl BucketRow {
    /// Row inserted for a key seen for the first time
    fn seed(args: &ConsumeArgs) -> Self {
        let state = BucketState::full(args.capacity, args.now_s);
        Self {
            tokens: state.tokens,
            last_refill_s: state.last_refill_s,
            expires_at_s: args.now_s.saturating_add(args.idle_ttl_s),
        }
    }

    /// Stored state, or `None` once the record has expired
    fn live_state(&self, now_s: i64) -> Option<BucketState> {
        (now_s < self.expires_at_s).then_some(BucketState {
            tokens: self.tokens,
            last_refill_s: self.last_refill_s,
        })
    }

    fn into_bucket(self, key: BucketKey) -> Bucket {
        Bucket {
            key,
            tokens: self.tokens,
            last_refill_s: self.last_refill_s,
            expires_at_s: self.expires_at_s,
        }
    }
}
