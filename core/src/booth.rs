//! Sponsor booth and booth visit records.

use crate::types::{AttendeeId, BoothId, EventId, SponsorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sponsor's booth at an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorBooth {
    /// Booth identifier
    pub id: BoothId,
    /// Event the booth is set up for
    pub event_id: EventId,
    /// Owning sponsor
    pub sponsor_id: SponsorId,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Where on the floor the booth is
    pub location: String,
    /// QR code attendees scan at the booth
    pub qr_code: String,
    /// Inactive booths reject new visits
    pub is_active: bool,
    /// Number of recorded visits (not distinct visitors)
    pub visitor_count: u64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a booth; the store assigns id and timestamps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSponsorBooth {
    /// Event the booth is set up for
    pub event_id: EventId,
    /// Owning sponsor
    pub sponsor_id: SponsorId,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Where on the floor the booth is
    pub location: String,
    /// QR code attendees scan at the booth
    pub qr_code: String,
    /// Creation time, also the initial `updated_at`
    pub created_at: DateTime<Utc>,
}

/// Partial update of a booth. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SponsorBoothUpdate {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New location
    pub location: Option<String>,
    /// Activate or deactivate
    pub is_active: Option<bool>,
    /// New cached visit count
    pub visitor_count: Option<u64>,
    /// Modification time
    pub updated_at: Option<DateTime<Utc>>,
}

impl SponsorBoothUpdate {
    /// Applies the update to an in-memory record.
    pub fn apply(self, booth: &mut SponsorBooth) {
        if let Some(name) = self.name {
            booth.name = name;
        }
        if let Some(description) = self.description {
            booth.description = description;
        }
        if let Some(location) = self.location {
            booth.location = location;
        }
        if let Some(is_active) = self.is_active {
            booth.is_active = is_active;
        }
        if let Some(visitor_count) = self.visitor_count {
            booth.visitor_count = visitor_count;
        }
        if let Some(updated_at) = self.updated_at {
            booth.updated_at = updated_at;
        }
    }
}

/// One visit of an attendee to a booth. Repeat visits produce repeat records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothVisitor {
    /// Booth visited
    pub booth_id: BoothId,
    /// Visiting attendee
    pub attendee_id: AttendeeId,
    /// When the visit was recorded
    pub visit_time: DateTime<Utc>,
    /// Length of the visit in minutes
    pub duration: u32,
    /// Sponsor notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Data needed to record a visit; `visit_time` comes from the caller's clock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBoothVisitor {
    /// Booth visited
    pub booth_id: BoothId,
    /// Visiting attendee
    pub attendee_id: AttendeeId,
    /// Length of the visit in minutes
    pub duration: u32,
    /// Sponsor notes
    pub notes: Option<String>,
    /// When the visit was recorded
    pub visit_time: DateTime<Utc>,
}

impl From<NewBoothVisitor> for BoothVisitor {
    fn from(visitor: NewBoothVisitor) -> Self {
        Self {
            booth_id: visitor.booth_id,
            attendee_id: visitor.attendee_id,
            visit_time: visitor.visit_time,
            duration: visitor.duration,
            notes: visitor.notes,
        }
    }
}
