//! Router configuration for the check-in service.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{booths, checkin};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Health probes sit at the root; everything else is nested under `/api`.
/// Requests are traced, and CORS admits `cors_origin` (any origin when it
/// is `*` or does not parse as a header value).
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let api_routes = Router::new()
        // Check-in workflow
        .route("/checkin", post(checkin::check_in))
        .route("/checkout", post(checkin::check_out))
        .route("/attendees/:id/cancel", post(checkin::cancel))
        .route("/validate-qr/:qr_code", get(checkin::validate_qr))
        // Reports
        .route("/attendance/:event_id", get(checkin::attendance_report))
        // Sponsor booths
        .route("/booth", post(booths::create_booth))
        .route("/booth/visitor", post(booths::add_visitor))
        .route("/booth/:id", put(booths::update_booth))
        .route("/booth/:id/visitors", get(booths::booth_visitors))
        .route("/booth/:id/stats", get(booths::booth_stats))
        .route("/events/:event_id/booths", get(booths::event_booths));

    Router::new()
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origin)),
        )
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match origin.parse::<HeaderValue>() {
        Ok(value) if origin != "*" => AllowOrigin::exact(value),
        _ => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any)
}
