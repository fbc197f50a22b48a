//! Read-only QR code validation.
//!
//! Answers "would this code be accepted at this event's door?" without
//! changing anything. Scanner apps call this before committing a check-in.

use eventix_core::error::Result;
use eventix_core::{AttendeeId, AttendeeStatus, AttendeeStore, CheckInError, EventId};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of validating a scanned code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Code that was scanned
    pub qr_code: String,
    /// Event the code was checked against
    pub event_id: EventId,
    /// Whether the door should accept the code
    pub is_valid: bool,
    /// Attendee holding the code, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_id: Option<AttendeeId>,
    /// That attendee's current status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendeeStatus>,
    /// Human-readable explanation
    pub message: String,
}

/// Validates QR codes against the attendee store.
#[derive(Clone)]
pub struct QrValidator {
    attendees: Arc<dyn AttendeeStore>,
}

impl QrValidator {
    /// Create a validator reading from `attendees`.
    #[must_use]
    pub fn new(attendees: Arc<dyn AttendeeStore>) -> Self {
        Self { attendees }
    }

    /// Validate `qr_code` for `event_id`.
    ///
    /// Checks run in priority order: unknown code, wrong event, cancelled,
    /// already checked in, ready. An already checked-in attendee is still
    /// valid since re-scanning at the door is harmless.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::InvalidArgument`] if either input is blank
    /// - [`CheckInError::Store`] if the lookup fails
    #[tracing::instrument(skip_all, fields(qr_code = %qr_code, event_id = %event_id))]
    pub async fn validate(&self, qr_code: &str, event_id: &EventId) -> Result<ValidationResult> {
        if qr_code.trim().is_empty() || event_id.is_blank() {
            return Err(CheckInError::invalid_argument(
                "Missing required fields: qrCode, eventId",
            ));
        }

        let result = |is_valid, attendee: Option<(&AttendeeId, AttendeeStatus)>, message: &str| {
            ValidationResult {
                qr_code: qr_code.to_string(),
                event_id: event_id.clone(),
                is_valid,
                attendee_id: attendee.map(|(id, _)| id.clone()),
                status: attendee.map(|(_, status)| status),
                message: message.to_string(),
            }
        };

        let Some(attendee) = self.attendees.find_by_qr_code(qr_code).await? else {
            tracing::debug!("QR code not found");
            return Ok(result(false, None, "QR code not found in system"));
        };

        let found = Some((&attendee.id, attendee.status));
        let validation = if &attendee.event_id != event_id {
            result(false, found, "QR code is not valid for this event")
        } else {
            match attendee.status {
                AttendeeStatus::Cancelled => {
                    result(false, found, "Attendee registration has been cancelled")
                }
                AttendeeStatus::CheckedIn => result(true, found, "Attendee is already checked in"),
                AttendeeStatus::Registered | AttendeeStatus::CheckedOut => {
                    result(true, found, "QR code is valid and ready for check-in")
                }
            }
        };

        tracing::debug!(
            attendee_id = %attendee.id,
            status = %attendee.status,
            is_valid = validation.is_valid,
            "QR code validated"
        );
        Ok(validation)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use eventix_testing::fixtures::AttendeeBuilder;
    use eventix_testing::InMemoryAttendeeStore;

    fn validator(store: &InMemoryAttendeeStore) -> QrValidator {
        QrValidator::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn unknown_code_is_invalid_without_attendee() {
        let store = InMemoryAttendeeStore::new();
        let result = validator(&store)
            .validate("Q9", &EventId::new("E1"))
            .await
            .unwrap();

        assert!(!result.is_valid);
        assert!(result.attendee_id.is_none());
        assert!(result.status.is_none());
        assert_eq!(result.qr_code, "Q9");
    }

    #[tokio::test]
    async fn wrong_event_beats_cancelled() {
        let store = InMemoryAttendeeStore::with_attendees([AttendeeBuilder::new("Q1", "E1").cancelled().build()]);
        let result = validator(&store)
            .validate("Q1", &EventId::new("E2"))
            .await
            .unwrap();

        assert!(!result.is_valid);
        assert_eq!(result.message, "QR code is not valid for this event");
        assert_eq!(result.status, Some(AttendeeStatus::Cancelled));
    }

    #[tokio::test]
    async fn cancelled_is_invalid() {
        let store = InMemoryAttendeeStore::with_attendees([AttendeeBuilder::new("Q1", "E1").cancelled().build()]);
        let result = validator(&store)
            .validate("Q1", &EventId::new("E1"))
            .await
            .unwrap();

        assert!(!result.is_valid);
        assert_eq!(result.message, "Attendee registration has been cancelled");
    }

    #[tokio::test]
    async fn checked_in_is_still_valid() {
        let store = InMemoryAttendeeStore::with_attendees([AttendeeBuilder::new("Q1", "E1").checked_in().build()]);
        let result = validator(&store)
            .validate("Q1", &EventId::new("E1"))
            .await
            .unwrap();

        assert!(result.is_valid);
        assert_eq!(result.message, "Attendee is already checked in");
    }

    #[tokio::test]
    async fn blank_inputs_are_rejected() {
        let store = InMemoryAttendeeStore::new();
        let v = validator(&store);

        assert!(matches!(
            v.validate("  ", &EventId::new("E1")).await,
            Err(CheckInError::InvalidArgument(_))
        ));
        assert!(matches!(
            v.validate("Q1", &EventId::new("")).await,
            Err(CheckInError::InvalidArgument(_))
        ));
        assert_eq!(store.read_count(), 0);
    }

    #[tokio::test]
    async fn validation_never_writes() {
        let store = InMemoryAttendeeStore::with_attendees([AttendeeBuilder::new("Q1", "E1").build()]);
        validator(&store).validate("Q1", &EventId::new("E1")).await.unwrap();
        assert_eq!(store.write_count(), 0);
    }
}
