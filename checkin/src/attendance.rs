//! Attendance report aggregation.
//!
//! A report is a snapshot computed from a single `find_by_event_id` read.
//! Totals, the check-in rate and the status breakdown cover every record;
//! the optional date range narrows only the hour-of-day histogram.

use crate::metrics;
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use eventix_core::environment::Clock;
use eventix_core::error::Result;
use eventix_core::{Attendee, AttendeeId, AttendeeStatus, AttendeeStore, CheckInError, EventId, UserId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

// ============================================================================
// Report Types
// ============================================================================

/// Attendance snapshot for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    /// Event reported on
    pub event_id: EventId,
    /// Every registration, whatever its status
    pub total_registered: usize,
    /// Currently CHECKED_IN
    pub total_checked_in: usize,
    /// Currently CHECKED_OUT
    pub total_checked_out: usize,
    /// Currently CANCELLED
    pub total_cancelled: usize,
    /// `total_checked_in / total_registered * 100`, two decimals
    pub check_in_rate: f64,
    /// Check-ins per local hour of day, ascending
    pub attendance_by_hour: Vec<HourlyAttendance>,
    /// Count per status present, largest first, ties by status name
    pub status_breakdown: Vec<StatusBreakdown>,
    /// Flattened attendee records
    pub attendees: Vec<AttendeeSummary>,
    /// When the report was computed
    pub generated_at: DateTime<Utc>,
}

/// Check-ins during one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyAttendance {
    /// Hour of day, 0-23
    pub hour: u32,
    /// Check-ins that hour
    pub count: usize,
}

/// Share of registrations in one status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusBreakdown {
    /// Status counted
    pub status: AttendeeStatus,
    /// Registrations in that status
    pub count: usize,
    /// Share of all registrations, two decimals
    pub percentage: f64,
}

/// Attendee fields included in a report; see [`Attendee`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeSummary {
    pub id: AttendeeId,
    pub user_id: UserId,
    pub qr_code: String,
    pub status: AttendeeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Attendee> for AttendeeSummary {
    fn from(attendee: &Attendee) -> Self {
        Self {
            id: attendee.id.clone(),
            user_id: attendee.user_id.clone(),
            qr_code: attendee.qr_code.clone(),
            status: attendee.status,
            check_in_time: attendee.check_in_time,
            check_out_time: attendee.check_out_time,
            created_at: attendee.created_at,
        }
    }
}

/// Inclusive bounds on check-in time. Filters only when both bounds are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Earliest check-in counted
    pub start: Option<DateTime<Utc>>,
    /// Latest check-in counted
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Whether `time` falls within the range. A half-open range admits everything.
    #[must_use]
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= time && time <= end,
            _ => true,
        }
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Builds [`AttendanceReport`]s from the attendee store.
#[derive(Clone)]
pub struct AttendanceReporter {
    attendees: Arc<dyn AttendeeStore>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl AttendanceReporter {
    /// Reporter bucketing check-ins by hour in `offset`.
    #[must_use]
    pub fn new(attendees: Arc<dyn AttendeeStore>, clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self {
            attendees,
            clock,
            offset,
        }
    }

    /// Build the report for `event_id`.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::InvalidArgument`] if `event_id` is blank or `start` is after `end`
    /// - [`CheckInError::Store`] if the query fails
    #[tracing::instrument(skip_all, fields(event_id = %event_id))]
    pub async fn build_report(
        &self,
        event_id: &EventId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<AttendanceReport> {
        if event_id.is_blank() {
            return Err(CheckInError::invalid_argument("Event ID is required"));
        }
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(CheckInError::invalid_argument(
                    "Start date must not be after end date",
                ));
            }
        }

        let attendees = self.attendees.find_by_event_id(event_id).await?;
        let report = aggregate(
            event_id.clone(),
            &attendees,
            DateRange { start, end },
            self.offset,
            self.clock.now(),
        );

        metrics::record_attendance_report(attendees.len());
        tracing::debug!(
            total_registered = report.total_registered,
            check_in_rate = report.check_in_rate,
            "Attendance report built"
        );
        Ok(report)
    }
}

/// Compute a report from records already read.
#[must_use]
pub fn aggregate(
    event_id: EventId,
    attendees: &[Attendee],
    range: DateRange,
    offset: FixedOffset,
    generated_at: DateTime<Utc>,
) -> AttendanceReport {
    let total_registered = attendees.len();
    let count = |status| attendees.iter().filter(|a| a.status == status).count();
    let total_checked_in = count(AttendeeStatus::CheckedIn);

    AttendanceReport {
        event_id,
        total_registered,
        total_checked_in,
        total_checked_out: count(AttendeeStatus::CheckedOut),
        total_cancelled: count(AttendeeStatus::Cancelled),
        check_in_rate: percentage(total_checked_in, total_registered),
        attendance_by_hour: by_hour(attendees, range, offset),
        status_breakdown: status_breakdown(attendees),
        attendees: attendees.iter().map(AttendeeSummary::from).collect(),
        generated_at,
    }
}

fn by_hour(attendees: &[Attendee], range: DateRange, offset: FixedOffset) -> Vec<HourlyAttendance> {
    let mut hours: BTreeMap<u32, usize> = BTreeMap::new();
    for time in attendees
        .iter()
        .filter_map(|a| a.check_in_time)
        .filter(|t| range.contains(*t))
    {
        *hours.entry(time.with_timezone(&offset).hour()).or_default() += 1;
    }

    hours
        .into_iter()
        .map(|(hour, count)| HourlyAttendance { hour, count })
        .collect()
}

fn status_breakdown(attendees: &[Attendee]) -> Vec<StatusBreakdown> {
    let total = attendees.len();
    let mut breakdown: Vec<StatusBreakdown> = AttendeeStatus::ALL
        .into_iter()
        .map(|status| {
            let count = attendees.iter().filter(|a| a.status == status).count();
            StatusBreakdown {
                status,
                count,
                percentage: percentage(count, total),
            }
        })
        .filter(|b| b.count > 0)
        .collect();

    breakdown.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.status.as_str().cmp(b.status.as_str()))
    });
    breakdown
}

/// `part / whole * 100`, two decimals, 0 when `whole` is 0.
#[allow(clippy::cast_precision_loss)] // Attendee counts stay far below 2^52
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
