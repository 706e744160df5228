//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Client identification from request headers
//! - Token bucket arithmetic and clocks

pub mod client;
pub mod rate_limit;
