//! Sentinel - Distributed token bucket admission control
//!
//! Clean Architecture structure:
//! - `domain/` - Token bucket engine, entities, store trait
//! - `application/` - Admission use case, configuration, event feed
//! - `infra/` - PostgreSQL and in-memory bucket stores
//! - `presentation/` - HTTP handlers
//!
//! ## Consistency Model
//! - Bucket state lives only in the store; nothing is cached in-process
//! - Each decision is one atomic read-modify-write on one key
//! - Refill is lazy, computed from elapsed seconds at access time
//! - A store outage resolves to a decision through the failure policy

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::check_admission::{AdmissionDecision, CheckAdmissionUseCase};
pub use application::config::{ClockSource, FailurePolicy, SentinelConfig};
pub use application::events::{AdmissionEvent, EventPublisher};
pub use domain::repository::BucketStore;
pub use error::{SentinelError, SentinelResult};
pub use infra::memory::MemoryBucketStore;
pub use infra::postgres::PgBucketStore;
pub use presentation::router::{sentinel_router, sentinel_router_generic};
