//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

/// Query for GET /api/rate-limit/check
///
/// Omitted values fall back to the configured default policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckQuery {
    #[serde(default)]
    pub capacity: Option<i64>,
    /// Tokens per second, may be fractional
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub cost: Option<i64>,
}

/// Response for GET /api/rate-limit/check (200 and 429)
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
}
