//! Infrastructure Layer
//!
//! Bucket store implementations.

pub mod memory;
pub mod postgres;
