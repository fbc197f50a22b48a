//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use eventix_core::AttendeeStore;
use serde::Serialize;

/// Health status of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    /// Component is fully operational
    Healthy,
    /// Component is not operational
    Unhealthy,
}

/// Result of a single health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    /// Name of the component being checked
    pub component: String,
    /// Current health status
    pub status: HealthStatus,
    /// Optional message providing details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the check ran
    pub timestamp: DateTime<Utc>,
}

impl HealthCheck {
    /// Create a healthy check result
    #[must_use]
    pub fn healthy(component: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Healthy,
            message: None,
            timestamp,
        }
    }

    /// Create an unhealthy check result
    #[must_use]
    pub fn unhealthy(
        component: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            timestamp,
        }
    }
}

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check dependencies (database, etc.).
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness check against the attendee store.
///
/// # Status Codes
///
/// - 200 OK: store reachable
/// - 503 Service Unavailable: store ping failed
///
/// # Response
///
/// ```json
/// {
///   "component": "attendee_store",
///   "status": "Healthy",
///   "timestamp": "2025-06-01T09:00:00Z"
/// }
/// ```
pub async fn readiness_check(
    store: &dyn AttendeeStore,
    now: DateTime<Utc>,
) -> (StatusCode, Json<HealthCheck>) {
    match store.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthCheck::healthy("attendee_store", now))),
        Err(error) => {
            tracing::warn!(error = %error, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthCheck::unhealthy("attendee_store", error.to_string(), now)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventix_core::StoreError;
    use eventix_testing::fixtures::fixture_time;
    use eventix_testing::InMemoryAttendeeStore;

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn readiness_reports_unreachable_store() {
        let store = InMemoryAttendeeStore::new();

        let (status, Json(check)) = readiness_check(&store, fixture_time()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(check.status, HealthStatus::Healthy);

        store.fail_with(StoreError::Database("connection refused".to_string()));
        let (status, Json(check)) = readiness_check(&store, fixture_time()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(check.status, HealthStatus::Unhealthy);
    }
}
