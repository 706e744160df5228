//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::http::HeaderMap;

/// Header carrying the caller-chosen bucket identifier (user id, API key, IP)
pub const IDENTIFIER_HEADER: &str = "x-user-id";

/// Error when extracting the client identifier
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentifierError {
    #[error("Header {0} is not valid visible ASCII")]
    InvalidHeader(String),
}

/// Extract the bucket identifier from `X-User-ID`.
///
/// A missing or blank header falls back to `default`.
pub fn extract_identifier(headers: &HeaderMap, default: &str) -> Result<String, IdentifierError> {
    match headers.get(IDENTIFIER_HEADER) {
        None => Ok(default.to_string()),
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| IdentifierError::InvalidHeader("X-User-ID".to_string()))?
                .trim();
            if value.is_empty() {
                Ok(default.to_string())
            } else {
                Ok(value.to_string())
            }
        }
    }
}
