//! Check-in, validation and attendance report endpoints.
//!
//! - POST /api/checkin - Check an attendee in
//! - POST /api/checkout - Check an attendee out
//! - POST /api/attendees/:id/cancel - Cancel a registration
//! - GET /api/validate-qr/:qrCode?eventId= - Validate a QR code without side effects
//! - GET /api/attendance/:eventId?startDate=&endDate= - Attendance report

#![allow(clippy::missing_errors_doc)] // Errors are HTTP responses

use crate::attendance::AttendanceReport;
use crate::check_in::{CheckInOutcome, CheckInRequest, CheckOutRequest};
use crate::server::state::AppState;
use crate::validator::ValidationResult;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use eventix_core::{AttendeeId, EventId};
use eventix_web::{ApiResponse, AppError, WebResult};
use serde::Deserialize;

// ============================================================================
// Request Types
// ============================================================================

/// Query string of the validation endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateQuery {
    /// Event the door belongs to
    #[serde(default)]
    pub event_id: Option<EventId>,
}

/// Query string of the report endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub end_date: Option<String>,
}

/// Body of the cancel endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    /// Why the registration was cancelled
    #[serde(default)]
    pub reason: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Check an attendee in.
///
/// ```bash
/// curl -X POST http://localhost:3003/api/checkin \
///   -H 'Content-Type: application/json' \
///   -d '{"qrCode":"Q1","eventId":"E1","checkedInBy":"staff1"}'
/// ```
pub async fn check_in(
    State(state): State<AppState>,
    Json(request): Json<CheckInRequest>,
) -> WebResult<ApiResponse<CheckInOutcome>> {
    let outcome = state.app.check_in.check_in(request).await?;
    Ok(ApiResponse::ok(outcome).with_message("Check-in successful"))
}

/// Check an attendee out.
pub async fn check_out(
    State(state): State<AppState>,
    Json(request): Json<CheckOutRequest>,
) -> WebResult<ApiResponse<CheckInOutcome>> {
    let outcome = state.app.check_in.check_out(request).await?;
    Ok(ApiResponse::ok(outcome).with_message("Check-out successful"))
}

/// Cancel a registration. The body is optional.
pub async fn cancel(
    State(state): State<AppState>,
    Path(attendee_id): Path<AttendeeId>,
    body: Option<Json<CancelRequest>>,
) -> WebResult<ApiResponse<CheckInOutcome>> {
    let reason = body.and_then(|Json(body)| body.reason);
    let outcome = state.app.check_in.cancel(&attendee_id, reason).await?;
    Ok(ApiResponse::ok(outcome).with_message("Registration cancelled"))
}

/// Validate a scanned code for an event.
///
/// ```bash
/// curl 'http://localhost:3003/api/validate-qr/Q1?eventId=E1'
/// ```
pub async fn validate_qr(
    State(state): State<AppState>,
    Path(qr_code): Path<String>,
    Query(query): Query<ValidateQuery>,
) -> WebResult<ApiResponse<ValidationResult>> {
    let event_id = query.event_id.unwrap_or_default();
    let result = state.app.validator.validate(&qr_code, &event_id).await?;
    Ok(ApiResponse::ok(result))
}

/// Attendance report for an event.
///
/// ```bash
/// curl 'http://localhost:3003/api/attendance/E1?startDate=2025-06-01&endDate=2025-06-02'
/// ```
pub async fn attendance_report(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    Query(query): Query<ReportQuery>,
) -> WebResult<ApiResponse<AttendanceReport>> {
    let start = parse_bound(query.start_date.as_deref(), "Invalid start date format")?;
    let end = parse_bound(query.end_date.as_deref(), "Invalid end date format")?;

    let report = state.app.reports.build_report(&event_id, start, end).await?;
    Ok(ApiResponse::ok(report))
}

/// Parse an optional date bound. Empty strings count as absent.
fn parse_bound(raw: Option<&str>, error: &'static str) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    parse_date(raw).map(Some).ok_or_else(|| AppError::bad_request(error))
}

/// RFC 3339 timestamps, or plain dates taken as midnight UTC.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;

    #[test]
    fn dates_parse_in_both_forms() {
        let midnight = parse_date("2025-06-01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2025-06-01T00:00:00+00:00");

        let offset = parse_date("2025-06-01T10:30:00+02:00").unwrap();
        assert_eq!(offset.to_rfc3339(), "2025-06-01T08:30:00+00:00");
    }

    #[test]
    fn bad_dates_name_the_bound() {
        let err = parse_bound(Some("yesterday"), "Invalid start date format").unwrap_err();
        assert_eq!(err.message(), "Invalid start date format");
        assert_eq!(parse_bound(Some("  "), "x").unwrap(), None);
        assert_eq!(parse_bound(None, "x").unwrap(), None);
    }
}
