//! Error conversions - From implementations for common error types
//!
//! Store error classification and HTTP rendering for [`AppError`].

use super::app_error::AppError;

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::service_unavailable("Bucket store unavailable").with_source(err)
            }
            sqlx::Error::Database(db_err) => {
                // Class 53 (insufficient resources) and 57 (operator intervention)
                // mean the store is down, everything else is a bug on our side.
                let unavailable = db_err
                    .code()
                    .map(|code| code.starts_with("53") || code.starts_with("57"))
                    .unwrap_or(false);
                if unavailable {
                    AppError::service_unavailable("Bucket store unavailable").with_source(err)
                } else {
                    AppError::internal("Bucket store error").with_source(err)
                }
            }
            _ => AppError::internal("Bucket store error").with_source(err),
        }
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details for HTTP APIs
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
        });

        (status, Json(body)).into_response()
    }
}
