//! Health check endpoints for the check-in service.
//!
//! `/health` is a liveness probe and never touches dependencies. `/ready`
//! pings the attendee store.

use super::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use eventix_web::handlers::{self, HealthCheck};

/// Liveness probe.
///
/// ```bash
/// curl http://localhost:3003/health
/// # ok
/// ```
pub async fn health_check() -> (StatusCode, &'static str) {
    handlers::health_check().await
}

/// Readiness probe: 200 while the attendee store answers, 503 otherwise.
///
/// ```bash
/// curl http://localhost:3003/ready
/// # {"component":"attendee_store","status":"Healthy","timestamp":"..."}
/// ```
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthCheck>) {
    handlers::readiness_check(state.app.attendee_store(), state.app.now()).await
}
