//! Business metrics for the check-in service.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `checkin_total{outcome}` - Check-in attempts by outcome
//!   (`checked_in`, `already_checked_in`, `rejected`)
//! - `checkout_total{outcome}` - Check-out attempts by outcome
//!   (`checked_out`, `already_checked_out`, `rejected`)
//! - `cancellations_total` - Registrations cancelled
//! - `booth_visits_total` - Booth visits recorded
//! - `attendance_reports_total` - Attendance reports generated
//! - `event_publish_failures_total{event_type}` - Notifications the bus refused
//!
//! ## Histograms
//! - `attendance_report_attendees` - Attendee records read per report

use metrics::{describe_counter, describe_histogram};

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "checkin_total",
        "Check-in attempts by outcome (checked_in, already_checked_in, rejected)"
    );
    describe_counter!(
        "checkout_total",
        "Check-out attempts by outcome (checked_out, already_checked_out, rejected)"
    );
    describe_counter!("cancellations_total", "Registrations cancelled");
    describe_counter!("booth_visits_total", "Sponsor booth visits recorded");
    describe_counter!("attendance_reports_total", "Attendance reports generated");
    describe_histogram!(
        "attendance_report_attendees",
        "Number of attendee records aggregated per report"
    );
    describe_counter!(
        "event_publish_failures_total",
        "Attendance notifications that could not be published"
    );

    tracing::info!("Business metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a check-in attempt.
pub fn record_check_in(outcome: &'static str) {
    metrics::counter!("checkin_total", "outcome" => outcome).increment(1);
    tracing::debug!(outcome, "Recorded checkin metric");
}

/// Record a check-out attempt.
pub fn record_check_out(outcome: &'static str) {
    metrics::counter!("checkout_total", "outcome" => outcome).increment(1);
    tracing::debug!(outcome, "Recorded checkout metric");
}

/// Record a cancellation.
pub fn record_cancellation() {
    metrics::counter!("cancellations_total").increment(1);
}

/// Record a booth visit.
pub fn record_booth_visit() {
    metrics::counter!("booth_visits_total").increment(1);
}

/// Record a generated attendance report.
///
/// # Arguments
///
/// * `attendees` - Number of attendee records aggregated
#[allow(clippy::cast_precision_loss)] // Attendee counts stay far below 2^52
pub fn record_attendance_report(attendees: usize) {
    metrics::counter!("attendance_reports_total").increment(1);
    metrics::histogram!("attendance_report_attendees").record(attendees as f64);
    tracing::debug!(attendees, "Recorded attendance_report metric");
}

/// Record a notification the event bus refused.
pub fn record_publish_failure(event_type: &'static str) {
    metrics::counter!("event_publish_failures_total", "event_type" => event_type).increment(1);
}
