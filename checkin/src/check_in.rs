//! Check-in state machine.
//!
//! Split in two the way the rest of the service is:
//!
//! - [`CheckInMachine::decide`] is pure. Given the current record, a command
//!   and the time, it says whether anything changes and what the patch is.
//! - [`CheckInService`] does the I/O around it: look up, guard, decide,
//!   write with a status compare-and-swap, publish.
//!
//! ```text
//!  scan ─▶ find_by_qr_code ─▶ event guard ─▶ decide ─┬─ Unchanged ─▶ return as-is (no write)
//!                                                    └─ Apply ─▶ update_if_status ─┬─ Some ─▶ publish
//!                                                                                  └─ None ─▶ re-read, decide again
//! ```

use crate::events::Notifier;
use crate::metrics;
use chrono::{DateTime, SecondsFormat, Utc};
use eventix_core::environment::Clock;
use eventix_core::error::Result;
use eventix_core::{
    AttendanceEvent, Attendee, AttendeeId, AttendeeStatus, AttendeeStore, AttendeeUpdate,
    CheckInError, EventId, Patch, StoreError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Decisions made per request; one initial attempt plus one after a lost race.
const MAX_ATTEMPTS: usize = 2;

// ============================================================================
// Pure decision
// ============================================================================

/// Something staff can do to an attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Admit at the door
    CheckIn,
    /// Record leaving the venue
    CheckOut,
    /// Cancel the registration
    Cancel,
}

impl Command {
    /// Status the command moves an attendee to.
    #[must_use]
    pub const fn target(self) -> AttendeeStatus {
        match self {
            Self::CheckIn => AttendeeStatus::CheckedIn,
            Self::CheckOut => AttendeeStatus::CheckedOut,
            Self::Cancel => AttendeeStatus::Cancelled,
        }
    }
}

/// What a command does to a particular record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Already in the target status; nothing to write
    Unchanged,
    /// Write `update`, valid only while the status is still `from`
    Apply {
        /// Status the decision was made against
        from: AttendeeStatus,
        /// Patch to write
        update: AttendeeUpdate,
    },
}

/// Pure transition rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckInMachine;

impl CheckInMachine {
    /// Decide what `command` does to `attendee` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckInError::Validation`] when the transition is not allowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use checkin_service::check_in::{CheckInMachine, Command, Decision};
    /// use eventix_core::{Attendee, AttendeeId, EventId, TicketId, UserId, Utc};
    ///
    /// let attendee = Attendee::register(
    ///     AttendeeId::new("a1"), EventId::new("E1"), UserId::new("u1"),
    ///     TicketId::new("t1"), "Q1", Utc::now(),
    /// );
    /// let decision = CheckInMachine::decide(&attendee, Command::CheckIn, Utc::now()).unwrap();
    /// assert!(matches!(decision, Decision::Apply { .. }));
    /// ```
    pub fn decide(attendee: &Attendee, command: Command, now: DateTime<Utc>) -> Result<Decision> {
        let from = attendee.status;
        let target = command.target();

        if from == target {
            return Ok(Decision::Unchanged);
        }
        if !from.can_transition_to(target) {
            return Err(CheckInError::validation(rejection_message(command, from)));
        }

        let mut update = AttendeeUpdate {
            status: Some(target),
            updated_at: Some(now),
            ..AttendeeUpdate::default()
        };
        match command {
            // Re-entry keeps the previous check-out time as the last exit.
            Command::CheckIn => update.check_in_time = Patch::Set(now),
            Command::CheckOut => update.check_out_time = Patch::Set(now),
            Command::Cancel => update.check_in_time = Patch::Clear,
        }

        Ok(Decision::Apply { from, update })
    }
}

fn rejection_message(command: Command, from: AttendeeStatus) -> &'static str {
    match (command, from) {
        (Command::CheckIn, _) => "Cannot check in cancelled attendee",
        (Command::CheckOut, AttendeeStatus::Registered) => "Attendee is not checked in",
        (Command::CheckOut, _) => "Cannot check out cancelled attendee",
        (Command::Cancel, _) => "Cannot cancel an attendee who has already checked out",
    }
}

// ============================================================================
// Requests and responses
// ============================================================================

/// Scan at the entrance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    /// Scanned code
    #[serde(default)]
    pub qr_code: String,
    /// Event the door belongs to; skips the event guard when absent
    #[serde(default)]
    pub event_id: Option<EventId>,
    /// Staff member scanning
    #[serde(default)]
    pub checked_in_by: String,
    /// Door or desk
    #[serde(default)]
    pub location: Option<String>,
}

/// Scan at the exit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutRequest {
    /// Scanned code
    #[serde(default)]
    pub qr_code: String,
    /// Event the exit belongs to; skips the event guard when absent
    #[serde(default)]
    pub event_id: Option<EventId>,
    /// Staff member scanning
    #[serde(default)]
    pub checked_out_by: String,
}

/// Result of a state machine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInOutcome {
    /// Record after the operation
    pub attendee: Attendee,
    /// Human-readable outcome
    pub message: String,
}

// ============================================================================
// Service
// ============================================================================

/// Drives [`CheckInMachine`] against the attendee store.
#[derive(Clone)]
pub struct CheckInService {
    attendees: Arc<dyn AttendeeStore>,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
}

impl CheckInService {
    /// Create a service over injected collaborators.
    #[must_use]
    pub fn new(attendees: Arc<dyn AttendeeStore>, clock: Arc<dyn Clock>, notifier: Notifier) -> Self {
        Self {
            attendees,
            clock,
            notifier,
        }
    }

    /// Check an attendee in by QR code.
    ///
    /// Checking in an attendee who is already checked in returns the record
    /// unchanged without writing.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::InvalidArgument`] if `qr_code` or `checked_in_by` is blank
    /// - [`CheckInError::NotFound`] if no attendee holds the code
    /// - [`CheckInError::Validation`] on an event mismatch or a cancelled attendee
    /// - [`CheckInError::Store`] if the store fails
    #[tracing::instrument(skip_all, fields(qr_code = %request.qr_code, checked_in_by = %request.checked_in_by))]
    pub async fn check_in(&self, request: CheckInRequest) -> Result<CheckInOutcome> {
        if is_blank(&request.qr_code) || is_blank(&request.checked_in_by) {
            return Err(CheckInError::invalid_argument(
                "Missing required fields: qrCode, checkedInBy",
            ));
        }

        let attendee = self.scanned(&request.qr_code, request.event_id.as_ref()).await;
        let result = match attendee {
            Ok(attendee) => self.transition(attendee, Command::CheckIn).await,
            Err(error) => Err(error),
        };

        let (attendee, changed) = match result {
            Ok(done) => done,
            Err(error) => {
                if matches!(error, CheckInError::Validation(_)) {
                    metrics::record_check_in("rejected");
                }
                tracing::info!(error = %error, "Check-in rejected");
                return Err(error);
            }
        };

        if !changed {
            metrics::record_check_in("already_checked_in");
            let message = format!(
                "Attendee {} is already checked in at {}",
                attendee.user_id,
                format_time(attendee.check_in_time)
            );
            tracing::info!(attendee_id = %attendee.id, "Attendee already checked in");
            return Ok(CheckInOutcome { attendee, message });
        }

        metrics::record_check_in("checked_in");
        tracing::info!(attendee_id = %attendee.id, event_id = %attendee.event_id, "Attendee checked in");

        self.notifier
            .notify(AttendanceEvent::AttendeeCheckedIn {
                attendee_id: attendee.id.clone(),
                event_id: attendee.event_id.clone(),
                user_id: attendee.user_id.clone(),
                checked_in_by: request.checked_in_by,
                location: request.location,
                checked_in_at: attendee.check_in_time.unwrap_or(attendee.updated_at),
            })
            .await;

        let message = format!(
            "Successfully checked in attendee {} for event {}",
            attendee.user_id, attendee.event_id
        );
        Ok(CheckInOutcome { attendee, message })
    }

    /// Check an attendee out by QR code.
    ///
    /// Checking out an attendee who is already checked out returns the record
    /// unchanged without writing.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::InvalidArgument`] if `qr_code` or `checked_out_by` is blank
    /// - [`CheckInError::NotFound`] if no attendee holds the code
    /// - [`CheckInError::Validation`] on an event mismatch, or when the attendee
    ///   is not checked in
    /// - [`CheckInError::Store`] if the store fails
    #[tracing::instrument(skip_all, fields(qr_code = %request.qr_code, checked_out_by = %request.checked_out_by))]
    pub async fn check_out(&self, request: CheckOutRequest) -> Result<CheckInOutcome> {
        if is_blank(&request.qr_code) || is_blank(&request.checked_out_by) {
            return Err(CheckInError::invalid_argument(
                "Missing required fields: qrCode, checkedOutBy",
            ));
        }

        let attendee = self.scanned(&request.qr_code, request.event_id.as_ref()).await?;
        let (attendee, changed) = match self.transition(attendee, Command::CheckOut).await {
            Ok(done) => done,
            Err(error) => {
                if matches!(error, CheckInError::Validation(_)) {
                    metrics::record_check_out("rejected");
                }
                return Err(error);
            }
        };

        if !changed {
            metrics::record_check_out("already_checked_out");
            let message = format!(
                "Attendee {} is already checked out at {}",
                attendee.user_id,
                format_time(attendee.check_out_time)
            );
            return Ok(CheckInOutcome { attendee, message });
        }

        metrics::record_check_out("checked_out");
        tracing::info!(attendee_id = %attendee.id, event_id = %attendee.event_id, "Attendee checked out");

        self.notifier
            .notify(AttendanceEvent::AttendeeCheckedOut {
                attendee_id: attendee.id.clone(),
                event_id: attendee.event_id.clone(),
                user_id: attendee.user_id.clone(),
                checked_out_by: request.checked_out_by,
                checked_out_at: attendee.check_out_time.unwrap_or(attendee.updated_at),
            })
            .await;

        let message = format!(
            "Successfully checked out attendee {} from event {}",
            attendee.user_id, attendee.event_id
        );
        Ok(CheckInOutcome { attendee, message })
    }

    /// Cancel a registration.
    ///
    /// Cancelling an already cancelled registration is a no-op.
    ///
    /// # Errors
    ///
    /// - [`CheckInError::InvalidArgument`] if `attendee_id` is blank
    /// - [`CheckInError::NotFound`] if the attendee does not exist
    /// - [`CheckInError::Validation`] if the attendee has already checked out
    /// - [`CheckInError::Store`] if the store fails
    #[tracing::instrument(skip_all, fields(attendee_id = %attendee_id))]
    pub async fn cancel(&self, attendee_id: &AttendeeId, reason: Option<String>) -> Result<CheckInOutcome> {
        if attendee_id.is_blank() {
            return Err(CheckInError::invalid_argument("Attendee ID is required"));
        }

        let attendee = self
            .attendees
            .find_by_id(attendee_id)
            .await?
            .ok_or_else(|| CheckInError::not_found("Attendee", attendee_id.as_str()))?;

        let (attendee, changed) = self.transition(attendee, Command::Cancel).await?;
        if !changed {
            let message = format!("Registration for attendee {} is already cancelled", attendee.user_id);
            return Ok(CheckInOutcome { attendee, message });
        }

        metrics::record_cancellation();
        tracing::info!(event_id = %attendee.event_id, reason = ?reason, "Registration cancelled");

        self.notifier
            .notify(AttendanceEvent::RegistrationCancelled {
                attendee_id: attendee.id.clone(),
                event_id: attendee.event_id.clone(),
                reason,
                cancelled_at: attendee.updated_at,
            })
            .await;

        let message = format!("Registration for attendee {} cancelled", attendee.user_id);
        Ok(CheckInOutcome { attendee, message })
    }

    /// Look up a scanned code and apply the event guard.
    async fn scanned(&self, qr_code: &str, event_id: Option<&EventId>) -> Result<Attendee> {
        let attendee = self
            .attendees
            .find_by_qr_code(qr_code)
            .await?
            .ok_or_else(|| CheckInError::not_found("Attendee", qr_code))?;

        if let Some(event_id) = event_id.filter(|id| !id.is_blank()) {
            if &attendee.event_id != event_id {
                return Err(CheckInError::validation("QR code is not valid for this event"));
            }
        }

        Ok(attendee)
    }

    /// Decide and write, re-deciding once if another writer got there first.
    ///
    /// Returns the resulting record and whether this call changed it.
    async fn transition(&self, mut attendee: Attendee, command: Command) -> Result<(Attendee, bool)> {
        let now = self.clock.now();

        for attempt in 1..=MAX_ATTEMPTS {
            let (from, update) = match CheckInMachine::decide(&attendee, command, now)? {
                Decision::Unchanged => return Ok((attendee, false)),
                Decision::Apply { from, update } => (from, update),
            };

            if let Some(updated) = self.attendees.update_if_status(&attendee.id, from, update).await? {
                return Ok((updated, true));
            }

            tracing::debug!(
                attendee_id = %attendee.id,
                attempt,
                expected = %from,
                "Attendee changed concurrently, re-reading"
            );
            attendee = self
                .attendees
                .find_by_id(&attendee.id)
                .await?
                .ok_or_else(|| CheckInError::not_found("Attendee", attendee.id.as_str()))?;
        }

        Err(StoreError::Conflict(format!(
            "attendee {} kept changing during {command:?}",
            attendee.id
        ))
        .into())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(
        || "an unknown time".to_string(),
        |t| t.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}
