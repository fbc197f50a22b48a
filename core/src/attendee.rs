//! Attendee record and its status lifecycle.

use crate::types::{AttendeeId, BoothId, EventId, TicketId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Status
// ============================================================================

/// Lifecycle status of an attendee registration.
///
/// Serialized in the upper snake case the rest of the Eventix platform uses
/// (`"CHECKED_IN"`), both on the wire and in the `attendees.status` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendeeStatus {
    /// Registered for the event, not yet on site
    Registered,
    /// Scanned in at the entrance
    CheckedIn,
    /// Left the venue after checking in
    CheckedOut,
    /// Registration cancelled (terminal)
    Cancelled,
}

impl AttendeeStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Registered,
        Self::CheckedIn,
        Self::CheckedOut,
        Self::Cancelled,
    ];

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// Self-transitions are not transitions; callers treat them as
    /// idempotent no-ops before consulting this table.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Registered, Self::CheckedIn | Self::Cancelled)
                | (Self::CheckedIn, Self::CheckedOut | Self::Cancelled)
                | (Self::CheckedOut, Self::CheckedIn)
        )
    }

    /// Whether no transition leaves this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether an attendee in this status must carry a check-in time.
    #[must_use]
    pub const fn has_checked_in(self) -> bool {
        matches!(self, Self::CheckedIn | Self::CheckedOut)
    }

    /// Database / wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "REGISTERED",
            Self::CheckedIn => "CHECKED_IN",
            Self::CheckedOut => "CHECKED_OUT",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse the database / wire representation.
    ///
    /// # Errors
    ///
    /// Returns the unrecognised input when it is not a known status.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "REGISTERED" => Ok(Self::Registered),
            "CHECKED_IN" => Ok(Self::CheckedIn),
            "CHECKED_OUT" => Ok(Self::CheckedOut),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("Invalid attendee status: {other}")),
        }
    }
}

impl fmt::Display for AttendeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Attendee
// ============================================================================

/// A visit an attendee paid to a sponsor booth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorBoothVisit {
    /// Booth visited
    pub booth_id: BoothId,
    /// When the visit started
    pub visit_time: DateTime<Utc>,
    /// Length of the visit in minutes
    pub duration: u32,
}

/// A registrant for an event, tracked through the check-in lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    /// Record identifier
    pub id: AttendeeId,
    /// Event the registration belongs to (never changes)
    pub event_id: EventId,
    /// Registered user
    pub user_id: UserId,
    /// Ticket used to register
    pub ticket_id: TicketId,
    /// Opaque QR token, unique across the system
    pub qr_code: String,
    /// Current lifecycle status
    pub status: AttendeeStatus,
    /// Most recent check-in time
    pub check_in_time: Option<DateTime<Utc>>,
    /// Most recent check-out time
    pub check_out_time: Option<DateTime<Utc>>,
    /// Booth visits recorded against this attendee
    #[serde(default)]
    pub sponsor_booth_visits: Vec<SponsorBoothVisit>,
    /// When the registration was recorded
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Attendee {
    /// Creates a freshly registered attendee.
    #[must_use]
    pub fn register(
        id: AttendeeId,
        event_id: EventId,
        user_id: UserId,
        ticket_id: TicketId,
        qr_code: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_id,
            user_id,
            ticket_id,
            qr_code: qr_code.into(),
            status: AttendeeStatus::Registered,
            check_in_time: None,
            check_out_time: None,
            sponsor_booth_visits: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the check-in time agrees with the status.
    #[must_use]
    pub const fn check_in_time_consistent(&self) -> bool {
        self.status.has_checked_in() == self.check_in_time.is_some()
    }
}

// ============================================================================
// Partial updates
// ============================================================================

/// Change to a nullable field.
///
/// `Unchanged` leaves the stored value alone, `Clear` writes `NULL`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Leave the field as stored
    #[default]
    Unchanged,
    /// Overwrite the field
    Set(T),
    /// Null the field
    Clear,
}

impl<T> Patch<T> {
    /// Whether this patch touches the field at all.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Applies the patch to a stored optional value.
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            Self::Unchanged => {}
            Self::Set(value) => *field = Some(value),
            Self::Clear => *field = None,
        }
    }

    /// The value to write when the field is touched.
    ///
    /// Returns `None` for both `Unchanged` and `Clear`; pair with
    /// [`is_unchanged`](Self::is_unchanged) to tell them apart.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unchanged | Self::Clear => None,
        }
    }
}

/// Fields the state machine is allowed to change on an attendee.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttendeeUpdate {
    /// New status, if changing
    pub status: Option<AttendeeStatus>,
    /// Check-in time change
    pub check_in_time: Patch<DateTime<Utc>>,
    /// Check-out time change
    pub check_out_time: Patch<DateTime<Utc>>,
    /// Modification time, if changing
    pub updated_at: Option<DateTime<Utc>>,
}

impl AttendeeUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.check_in_time.is_unchanged()
            && self.check_out_time.is_unchanged()
            && self.updated_at.is_none()
    }

    /// Applies the update to an in-memory record.
    pub fn apply(self, attendee: &mut Attendee) {
        if let Some(status) = self.status {
            attendee.status = status;
        }
        self.check_in_time.apply_to(&mut attendee.check_in_time);
        self.check_out_time.apply_to(&mut attendee.check_out_time);
        if let Some(updated_at) = self.updated_at {
            attendee.updated_at = updated_at;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use chrono::TimeZone;

    fn sample() -> Attendee {
        Attendee::register(
            AttendeeId::new("a1"),
            EventId::new("E1"),
            UserId::new("u1"),
            TicketId::new("t1"),
            "Q1",
            Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn forward_transitions_are_allowed() {
        use AttendeeStatus::*;
        assert!(Registered.can_transition_to(CheckedIn));
        assert!(CheckedIn.can_transition_to(CheckedOut));
        assert!(CheckedOut.can_transition_to(CheckedIn));
        assert!(Registered.can_transition_to(Cancelled));
        assert!(CheckedIn.can_transition_to(Cancelled));
    }

    #[test]
    fn cancelled_is_terminal() {
        for next in AttendeeStatus::ALL {
            assert!(!AttendeeStatus::Cancelled.can_transition_to(next));
        }
        assert!(AttendeeStatus::Cancelled.is_terminal());
    }

    #[test]
    fn backward_and_self_transitions_are_rejected() {
        use AttendeeStatus::*;
        assert!(!CheckedIn.can_transition_to(Registered));
        assert!(!CheckedOut.can_transition_to(Registered));
        assert!(!CheckedOut.can_transition_to(Cancelled));
        for status in AttendeeStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in AttendeeStatus::ALL {
            assert_eq!(AttendeeStatus::parse(status.as_str()), Ok(status));
        }
        assert!(AttendeeStatus::parse("checked_in").is_err());
    }

    #[test]
    fn status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&AttendeeStatus::CheckedOut).unwrap();
        assert_eq!(json, "\"CHECKED_OUT\"");
    }

    #[test]
    fn registered_attendee_is_consistent() {
        let attendee = sample();
        assert_eq!(attendee.status, AttendeeStatus::Registered);
        assert!(attendee.check_in_time_consistent());
    }

    #[test]
    fn update_apply_sets_and_clears() {
        let mut attendee = sample();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();

        AttendeeUpdate {
            status: Some(AttendeeStatus::CheckedIn),
            check_in_time: Patch::Set(at),
            updated_at: Some(at),
            ..AttendeeUpdate::default()
        }
        .apply(&mut attendee);
        assert_eq!(attendee.check_in_time, Some(at));
        assert_eq!(attendee.updated_at, at);
        assert!(attendee.check_in_time_consistent());

        AttendeeUpdate {
            status: Some(AttendeeStatus::Cancelled),
            check_in_time: Patch::Clear,
            ..AttendeeUpdate::default()
        }
        .apply(&mut attendee);
        assert_eq!(attendee.check_in_time, None);
        assert!(attendee.check_in_time_consistent());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(AttendeeUpdate::default().is_empty());
        let update = AttendeeUpdate {
            check_out_time: Patch::Clear,
            ..AttendeeUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn attendee_json_uses_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["qrCode"], "Q1");
        assert_eq!(value["eventId"], "E1");
        assert_eq!(value["status"], "REGISTERED");
        assert!(value["checkInTime"].is_null());
    }
}
