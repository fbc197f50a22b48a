//! Downstream notifications emitted after successful writes.
//!
//! The check-in workflow publishes an [`AttendanceEvent`] once the store has
//! accepted a change. Delivery is fire-and-forget from the workflow's point of
//! view: a publish failure is reported to the caller of [`EventBus::publish`]
//! but never rolls back the write that triggered it.
//!
//! ```text
//! check in ──▶ store.update_if_status ──▶ event_bus.publish("checkin-events", …)
//!                     (source of truth)        (at-most-once notification)
//! ```
//!
//! # Topic naming
//!
//! All attendance events go to a single topic (default `checkin-events`);
//! consumers dispatch on the `type` tag of the JSON payload.

use crate::types::{AttendeeId, BoothId, EventId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur while publishing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventBusError {
    /// Failed to publish an event to a topic
    #[error("Publish failed for topic '{topic}': {reason}")]
    PublishFailed {
        /// The topic that failed
        topic: String,
        /// The reason for failure
        reason: String,
    },

    /// Failed to serialize the payload
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Network or transport error
    #[error("Transport error: {0}")]
    TransportError(String),
}

/// Something that happened to an attendee or booth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttendanceEvent {
    /// Attendee entered the venue
    AttendeeCheckedIn {
        /// Attendee record
        attendee_id: AttendeeId,
        /// Event entered
        event_id: EventId,
        /// Registered user
        user_id: UserId,
        /// Staff member who scanned the code
        checked_in_by: String,
        /// Scanning location, if reported
        #[serde(skip_serializing_if = "Option::is_none")]
        location: Option<String>,
        /// When the check-in was recorded
        checked_in_at: DateTime<Utc>,
    },

    /// Attendee left the venue
    AttendeeCheckedOut {
        /// Attendee record
        attendee_id: AttendeeId,
        /// Event left
        event_id: EventId,
        /// Registered user
        user_id: UserId,
        /// Staff member who recorded the exit
        checked_out_by: String,
        /// When the check-out was recorded
        checked_out_at: DateTime<Utc>,
    },

    /// Registration was cancelled
    RegistrationCancelled {
        /// Attendee record
        attendee_id: AttendeeId,
        /// Event the registration was for
        event_id: EventId,
        /// Cancellation reason, if given
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        /// When the cancellation was recorded
        cancelled_at: DateTime<Utc>,
    },

    /// Attendee visited a sponsor booth
    BoothVisited {
        /// Booth visited
        booth_id: BoothId,
        /// Visiting attendee
        attendee_id: AttendeeId,
        /// Visit length in minutes
        duration: u32,
        /// When the visit was recorded
        visited_at: DateTime<Utc>,
    },
}

impl AttendanceEvent {
    /// Stable event type name, matching the serialized `type` tag.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::AttendeeCheckedIn { .. } => "attendee_checked_in",
            Self::AttendeeCheckedOut { .. } => "attendee_checked_out",
            Self::RegistrationCancelled { .. } => "registration_cancelled",
            Self::BoothVisited { .. } => "booth_visited",
        }
    }

    /// Serialize to the JSON payload put on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::SerializationFailed`] if encoding fails.
    pub fn to_json(&self) -> Result<Vec<u8>, EventBusError> {
        serde_json::to_vec(self).map_err(|e| EventBusError::SerializationFailed(e.to_string()))
    }
}

/// Publisher for attendance notifications.
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of
/// `async fn` so it can be shared as `Arc<dyn EventBus>`.
pub trait EventBus: Send + Sync {
    /// Publish an event to a topic.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError`] if the event could not be handed to the transport.
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        event: &'a AttendanceEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), EventBusError>> + Send + 'a>>;
}
