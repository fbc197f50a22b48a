//! Sponsor booth management and visit tracking.
//!
//! `visitor_count` on a booth counts recorded visits. [`BoothStats`] reports
//! distinct attendees separately, so the two numbers differ once anyone
//! comes back.

use crate::attendance::round2;
use crate::events::Notifier;
use crate::metrics;
use eventix_core::environment::Clock;
use eventix_core::error::Result;
use eventix_core::{
    AttendanceEvent, AttendeeId, BoothId, BoothVisitor, CheckInError, EventId, NewBoothVisitor,
    NewSponsorBooth, SponsorBooth, SponsorBoothStore, SponsorBoothUpdate, SponsorId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Characters of random suffix on generated booth QR codes.
const QR_SUFFIX_LEN: usize = 6;

/// Booth to set up. Missing fields deserialize empty and are rejected by
/// [`BoothTracker::create_booth`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBoothRequest {
    /// Event the booth is for
    pub event_id: EventId,
    /// Owning sponsor
    pub sponsor_id: SponsorId,
    /// Display name
    pub name: String,
    /// Free-form description, empty when omitted
    pub description: Option<String>,
    /// Where on the floor the booth is
    pub location: String,
}

/// Changes to a booth. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoothRequest {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New location
    pub location: Option<String>,
    /// Open or close the booth
    pub is_active: Option<bool>,
}

/// A visit to record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddVisitorRequest {
    /// Booth visited
    pub booth_id: BoothId,
    /// Visiting attendee
    pub attendee_id: AttendeeId,
    /// Visit length in minutes, at least 1
    pub duration: u32,
    /// Sponsor notes
    pub notes: Option<String>,
}

/// Visit statistics for one booth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothStats {
    /// Distinct attendees
    pub total_visitors: usize,
    /// Recorded visits
    pub total_visits: usize,
    /// Mean visit length in minutes, two decimals
    pub average_visit_duration: f64,
}

impl BoothStats {
    /// Compute stats over a booth's visits.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Visit counts and minute totals stay far below 2^52
    pub fn from_visits(visits: &[BoothVisitor]) -> Self {
        let total_visits = visits.len();
        let total_visitors = visits
            .iter()
            .map(|v| &v.attendee_id)
            .collect::<HashSet<_>>()
            .len();
        let average_visit_duration = if total_visits == 0 {
            0.0
        } else {
            let minutes: u64 = visits.iter().map(|v| u64::from(v.duration)).sum();
            round2(minutes as f64 / total_visits as f64)
        };

        Self {
            total_visitors,
            total_visits,
            average_visit_duration,
        }
    }
}

/// Booth operations over the booth store.
#[derive(Clone)]
pub struct BoothTracker {
    booths: Arc<dyn SponsorBoothStore>,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
}

impl BoothTracker {
    /// Tracker over injected collaborators.
    #[must_use]
    pub fn new(booths: Arc<dyn SponsorBoothStore>, clock: Arc<dyn Clock>, notifier: Notifier) -> Self {
        Self {
            booths,
            clock,
            notifier,
        }
    }

    /// Set up a booth with a freshly generated QR code.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::InvalidArgument`] if event, sponsor, name or location is blank
    /// - [`CheckInError::Store`] if the insert fails
    #[tracing::instrument(skip_all, fields(event_id = %request.event_id, sponsor_id = %request.sponsor_id))]
    pub async fn create_booth(&self, request: CreateBoothRequest) -> Result<SponsorBooth> {
        if request.event_id.is_blank()
            || request.sponsor_id.is_blank()
            || request.name.trim().is_empty()
            || request.location.trim().is_empty()
        {
            return Err(CheckInError::invalid_argument(
                "Missing required fields: eventId, sponsorId, name, location",
            ));
        }

        let qr_code = self.booth_qr_code(&request.event_id, &request.sponsor_id);
        let booth = self
            .booths
            .create(NewSponsorBooth {
                event_id: request.event_id,
                sponsor_id: request.sponsor_id,
                name: request.name,
                description: request.description.unwrap_or_default(),
                location: request.location,
                qr_code,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(booth_id = %booth.id, qr_code = %booth.qr_code, "Sponsor booth created");
        Ok(booth)
    }

    /// Apply changes to a booth.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::InvalidArgument`] if `booth_id` is blank
    /// - [`CheckInError::NotFound`] if the booth does not exist
    /// - [`CheckInError::Store`] if the update fails
    #[tracing::instrument(skip_all, fields(booth_id = %booth_id))]
    pub async fn update_booth(&self, booth_id: &BoothId, request: UpdateBoothRequest) -> Result<SponsorBooth> {
        self.existing(booth_id).await?;

        let booth = self
            .booths
            .update(
                booth_id,
                SponsorBoothUpdate {
                    name: request.name,
                    description: request.description,
                    location: request.location,
                    is_active: request.is_active,
                    visitor_count: None,
                    updated_at: Some(self.clock.now()),
                },
            )
            .await?;

        tracing::info!(is_active = booth.is_active, "Sponsor booth updated");
        Ok(booth)
    }

    /// Record a visit and bump the booth's visit count.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::InvalidArgument`] if an id is blank or `duration` is 0
    /// - [`CheckInError::NotFound`] if the booth does not exist
    /// - [`CheckInError::Validation`] if the booth is inactive
    /// - [`CheckInError::Store`] if a write fails
    #[tracing::instrument(skip_all, fields(booth_id = %request.booth_id, attendee_id = %request.attendee_id))]
    pub async fn add_visitor(&self, request: AddVisitorRequest) -> Result<BoothVisitor> {
        if request.booth_id.is_blank() || request.attendee_id.is_blank() || request.duration == 0 {
            return Err(CheckInError::invalid_argument(
                "Missing required fields: boothId, attendeeId, duration",
            ));
        }

        let booth = self.existing(&request.booth_id).await?;
        if !booth.is_active {
            return Err(CheckInError::validation("Booth is not active"));
        }

        let now = self.clock.now();
        let visitor = self
            .booths
            .add_visitor(NewBoothVisitor {
                booth_id: request.booth_id,
                attendee_id: request.attendee_id,
                duration: request.duration,
                notes: request.notes,
                visit_time: now,
            })
            .await?;

        // Not atomic with the insert; concurrent visits can undercount.
        self.booths
            .update(
                &booth.id,
                SponsorBoothUpdate {
                    visitor_count: Some(booth.visitor_count + 1),
                    updated_at: Some(now),
                    ..SponsorBoothUpdate::default()
                },
            )
            .await?;

        metrics::record_booth_visit();
        self.notifier
            .notify(AttendanceEvent::BoothVisited {
                booth_id: visitor.booth_id.clone(),
                attendee_id: visitor.attendee_id.clone(),
                duration: visitor.duration,
                visited_at: visitor.visit_time,
            })
            .await;

        Ok(visitor)
    }

    /// Every visit recorded at a booth, oldest first.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::InvalidArgument`] if `booth_id` is blank
    /// - [`CheckInError::Store`] if the query fails
    pub async fn visitors(&self, booth_id: &BoothId) -> Result<Vec<BoothVisitor>> {
        if booth_id.is_blank() {
            return Err(CheckInError::invalid_argument("Booth ID is required"));
        }
        Ok(self.booths.get_visitors(booth_id).await?)
    }

    /// Visit statistics for a booth. A booth with no visits reports zeroes.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::InvalidArgument`] if `booth_id` is blank
    /// - [`CheckInError::Store`] if the query fails
    pub async fn stats(&self, booth_id: &BoothId) -> Result<BoothStats> {
        let visits = self.visitors(booth_id).await?;
        Ok(BoothStats::from_visits(&visits))
    }

    /// Every booth set up for an event.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::InvalidArgument`] if `event_id` is blank
    /// - [`CheckInError::Store`] if the query fails
    pub async fn booths_for_event(&self, event_id: &EventId) -> Result<Vec<SponsorBooth>> {
        if event_id.is_blank() {
            return Err(CheckInError::invalid_argument("Event ID is required"));
        }
        Ok(self.booths.find_by_event_id(event_id).await?)
    }

    async fn existing(&self, booth_id: &BoothId) -> Result<SponsorBooth> {
        if booth_id.is_blank() {
            return Err(CheckInError::invalid_argument("Booth ID is required"));
        }
        self.booths
            .find_by_id(booth_id)
            .await?
            .ok_or_else(|| CheckInError::not_found("Booth", booth_id.as_str()))
    }

    /// `BOOTH_{event}_{sponsor}_{millis}_{suffix}`.
    fn booth_qr_code(&self, event_id: &EventId, sponsor_id: &SponsorId) -> String {
        let suffix: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(QR_SUFFIX_LEN)
            .collect();
        format!(
            "BOOTH_{event_id}_{sponsor_id}_{}_{suffix}",
            self.clock.now().timestamp_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use eventix_testing::fixtures::fixture_time;

    fn visit(attendee: &str, duration: u32) -> BoothVisitor {
        BoothVisitor {
            booth_id: BoothId::new("b1"),
            attendee_id: AttendeeId::new(attendee),
            visit_time: fixture_time(),
            duration,
            notes: None,
        }
    }

    #[test]
    fn stats_count_distinct_visitors() {
        let stats = BoothStats::from_visits(&[visit("a1", 10), visit("a1", 20), visit("a2", 5)]);

        assert_eq!(stats.total_visitors, 2);
        assert_eq!(stats.total_visits, 3);
        assert!((stats.average_visit_duration - 11.67).abs() < f64::EPSILON);
    }

    #[test]
    fn stats_of_nothing_are_zero() {
        let stats = BoothStats::from_visits(&[]);
        assert_eq!(stats.total_visits, 0);
        assert!(stats.average_visit_duration.abs() < f64::EPSILON);
    }

    #[test]
    fn update_request_fields_are_optional() {
        let request: UpdateBoothRequest = serde_json::from_str(r#"{"isActive":false}"#).unwrap();
        assert_eq!(request.is_active, Some(false));
        assert!(request.name.is_none());
    }
}
