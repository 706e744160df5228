//! Shared Kernel - Cross-crate error vocabulary
//!
//! This crate holds the error types every service crate agrees on:
//! - [`error::kind::ErrorKind`] - HTTP-mapped error classification
//! - [`error::app_error::AppError`] - unified error value and `AppResult<T>`
//!
//! Service crates define their own `thiserror` enums and convert into
//! `AppError` at the transport boundary.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
