//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Bucket)
//! - Domain value objects (BucketKey, AdmissionRequest, ConsumeArgs)
//! - Domain services (token bucket engine)
//! - Repository traits (atomic bucket store)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
