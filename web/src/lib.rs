//! Axum integration shared by Eventix HTTP services.
//!
//! Services keep their business logic in plain async functions that return
//! [`CheckInError`](eventix_core::CheckInError). This crate is the thin shell
//! that turns those results into HTTP:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           HTTP shell (Axum)             │  ← JSON extraction, envelopes
//! │  - ApiResponse / AppError               │  ← status code mapping
//! ├─────────────────────────────────────────┤
//! │           Check-in core                 │
//! │  - validation, state machine, reports   │  ← injected stores and clock
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use eventix_web::{ApiResponse, WebResult};
//!
//! async fn handler() -> WebResult<ApiResponse<&'static str>> {
//!     Ok(ApiResponse::ok("pong").with_message("alive"))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod envelope;
pub mod error;
pub mod handlers;

// Re-export key types for convenience
pub use envelope::ApiResponse;
pub use error::AppError;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
