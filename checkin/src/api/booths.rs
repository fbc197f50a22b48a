//! Sponsor booth endpoints.
//!
//! - POST /api/booth - Create a booth
//! - PUT /api/booth/:id - Update a booth
//! - POST /api/booth/visitor - Record a visit
//! - GET /api/booth/:boothId/visitors - List visits
//! - GET /api/booth/:boothId/stats - Visit statistics
//! - GET /api/events/:eventId/booths - Booths at an event

#![allow(clippy::missing_errors_doc)] // Errors are HTTP responses

use crate::booth::{AddVisitorRequest, BoothStats, CreateBoothRequest, UpdateBoothRequest};
use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use eventix_core::{BoothId, BoothVisitor, EventId, SponsorBooth};
use eventix_web::{ApiResponse, WebResult};

/// Create a booth.
pub async fn create_booth(
    State(state): State<AppState>,
    Json(request): Json<CreateBoothRequest>,
) -> WebResult<ApiResponse<SponsorBooth>> {
    let booth = state.app.booths.create_booth(request).await?;
    Ok(ApiResponse::created(booth).with_message("Sponsor booth created successfully"))
}

/// Update a booth.
pub async fn update_booth(
    State(state): State<AppState>,
    Path(booth_id): Path<BoothId>,
    Json(request): Json<UpdateBoothRequest>,
) -> WebResult<ApiResponse<SponsorBooth>> {
    let booth = state.app.booths.update_booth(&booth_id, request).await?;
    Ok(ApiResponse::ok(booth).with_message("Sponsor booth updated successfully"))
}

/// Record a visit.
pub async fn add_visitor(
    State(state): State<AppState>,
    Json(request): Json<AddVisitorRequest>,
) -> WebResult<ApiResponse<BoothVisitor>> {
    let visitor = state.app.booths.add_visitor(request).await?;
    Ok(ApiResponse::created(visitor).with_message("Visitor added to booth successfully"))
}

/// List visits to a booth.
pub async fn booth_visitors(
    State(state): State<AppState>,
    Path(booth_id): Path<BoothId>,
) -> WebResult<ApiResponse<Vec<BoothVisitor>>> {
    Ok(ApiResponse::ok(state.app.booths.visitors(&booth_id).await?))
}

/// Visit statistics for a booth.
pub async fn booth_stats(
    State(state): State<AppState>,
    Path(booth_id): Path<BoothId>,
) -> WebResult<ApiResponse<BoothStats>> {
    Ok(ApiResponse::ok(state.app.booths.stats(&booth_id).await?))
}

/// Booths set up for an event.
pub async fn event_booths(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> WebResult<ApiResponse<Vec<SponsorBooth>>> {
    Ok(ApiResponse::ok(state.app.booths.booths_for_event(&event_id).await?))
}
