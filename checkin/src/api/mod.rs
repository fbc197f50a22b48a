//! HTTP API handlers.
//!
//! Handlers extract JSON/path/query input, call one [`CheckInApp`](crate::app::CheckInApp)
//! operation and wrap the result in the [`ApiResponse`](eventix_web::ApiResponse)
//! envelope. Domain errors become [`AppError`](eventix_web::AppError)s via `?`.

pub mod booths;
pub mod checkin;
