//! Builders for attendee and booth test data.
//!
//! Timestamps default to [`fixture_time`], the instant [`crate::test_clock`]
//! starts at, so records line up with a service driven by the test clock.

#![allow(clippy::expect_used)] // Hardcoded timestamps

use chrono::{DateTime, Duration, Utc};
use eventix_core::{
    Attendee, AttendeeId, AttendeeStatus, BoothId, EventId, SponsorBooth, SponsorId, TicketId,
    UserId,
};

/// 2025-06-01 09:00:00 UTC.
///
/// # Panics
///
/// Never in practice; the timestamp is hardcoded.
#[must_use]
pub fn fixture_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T09:00:00Z")
        .expect("hardcoded timestamp should always parse")
        .with_timezone(&Utc)
}

/// Builder for [`Attendee`] records.
///
/// ```
/// use eventix_core::AttendeeStatus;
/// use eventix_testing::fixtures::AttendeeBuilder;
///
/// let attendee = AttendeeBuilder::new("Q1", "E1").checked_in().build();
/// assert_eq!(attendee.status, AttendeeStatus::CheckedIn);
/// assert!(attendee.check_in_time.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct AttendeeBuilder {
    attendee: Attendee,
}

impl AttendeeBuilder {
    /// A registered attendee holding `qr_code` for `event_id`.
    ///
    /// Ids are derived from the QR code so tests can predict them.
    #[must_use]
    pub fn new(qr_code: &str, event_id: &str) -> Self {
        Self {
            attendee: Attendee::register(
                AttendeeId::new(format!("att-{qr_code}")),
                EventId::new(event_id),
                UserId::new(format!("user-{qr_code}")),
                TicketId::new(format!("ticket-{qr_code}")),
                qr_code,
                fixture_time() - Duration::days(7),
            ),
        }
    }

    /// Override the record id.
    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.attendee.id = AttendeeId::new(id);
        self
    }

    /// Override the user id.
    #[must_use]
    pub fn user(mut self, user_id: &str) -> Self {
        self.attendee.user_id = UserId::new(user_id);
        self
    }

    /// Set the status without touching timestamps.
    #[must_use]
    pub fn status(mut self, status: AttendeeStatus) -> Self {
        self.attendee.status = status;
        self
    }

    /// Checked in at [`fixture_time`].
    #[must_use]
    pub fn checked_in(self) -> Self {
        self.checked_in_at(fixture_time())
    }

    /// Checked in at `at`.
    #[must_use]
    pub fn checked_in_at(mut self, at: DateTime<Utc>) -> Self {
        self.attendee.status = AttendeeStatus::CheckedIn;
        self.attendee.check_in_time = Some(at);
        self.attendee.check_out_time = None;
        self.attendee.updated_at = at;
        self
    }

    /// Checked in at `checked_in` and out at `checked_out`.
    #[must_use]
    pub fn checked_out_at(mut self, checked_in: DateTime<Utc>, checked_out: DateTime<Utc>) -> Self {
        self.attendee.status = AttendeeStatus::CheckedOut;
        self.attendee.check_in_time = Some(checked_in);
        self.attendee.check_out_time = Some(checked_out);
        self.attendee.updated_at = checked_out;
        self
    }

    /// Cancelled before arriving.
    #[must_use]
    pub fn cancelled(mut self) -> Self {
        self.attendee.status = AttendeeStatus::Cancelled;
        self.attendee.check_in_time = None;
        self
    }

    /// Registered `minutes` before [`fixture_time`].
    #[must_use]
    pub fn created_minutes_ago(mut self, minutes: i64) -> Self {
        let at = fixture_time() - Duration::minutes(minutes);
        self.attendee.created_at = at;
        self.attendee.updated_at = at;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Attendee {
        self.attendee
    }
}

/// An active booth for `event_id` with no visits recorded.
#[must_use]
pub fn booth(id: &str, event_id: &str) -> SponsorBooth {
    SponsorBooth {
        id: BoothId::new(id),
        event_id: EventId::new(event_id),
        sponsor_id: SponsorId::new("sponsor-1"),
        name: format!("Booth {id}"),
        description: "Demo stand".to_string(),
        location: "Hall A".to_string(),
        qr_code: format!("BOOTH_{event_id}_sponsor-1_{id}"),
        is_active: true,
        visitor_count: 0,
        created_at: fixture_time() - Duration::days(1),
        updated_at: fixture_time() - Duration::days(1),
    }
}
