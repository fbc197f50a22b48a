//! Service wiring.
//!
//! [`CheckInApp`] owns one instance of each service, built from injected
//! stores, clock and event bus. The server binary builds it from
//! [`Config`]; tests build it over the in-memory stores.

use crate::attendance::AttendanceReporter;
use crate::booth::BoothTracker;
use crate::check_in::CheckInService;
use crate::config::{Config, ConfigError};
use crate::events::Notifier;
use crate::validator::QrValidator;
use chrono::{DateTime, FixedOffset, Utc};
use eventix_core::environment::Clock;
use eventix_core::{AttendeeStore, EventBus, SponsorBoothStore};
use std::sync::Arc;

/// Collaborators every service is built from.
#[derive(Clone)]
pub struct Dependencies {
    /// Attendee persistence
    pub attendees: Arc<dyn AttendeeStore>,
    /// Booth persistence
    pub booths: Arc<dyn SponsorBoothStore>,
    /// Time source
    pub clock: Arc<dyn Clock>,
    /// Downstream notifications
    pub event_bus: Arc<dyn EventBus>,
}

/// The check-in service's operations, ready to be called.
#[derive(Clone)]
pub struct CheckInApp {
    /// QR validation
    pub validator: QrValidator,
    /// Check-in, check-out and cancellation
    pub check_in: CheckInService,
    /// Attendance reports
    pub reports: AttendanceReporter,
    /// Sponsor booths
    pub booths: BoothTracker,
    attendees: Arc<dyn AttendeeStore>,
    clock: Arc<dyn Clock>,
}

impl CheckInApp {
    /// Build every service over `deps`.
    #[must_use]
    pub fn new(deps: Dependencies, topic: impl Into<String>, report_offset: FixedOffset) -> Self {
        let notifier = Notifier::new(deps.event_bus, topic);

        Self {
            validator: QrValidator::new(Arc::clone(&deps.attendees)),
            check_in: CheckInService::new(
                Arc::clone(&deps.attendees),
                Arc::clone(&deps.clock),
                notifier.clone(),
            ),
            reports: AttendanceReporter::new(
                Arc::clone(&deps.attendees),
                Arc::clone(&deps.clock),
                report_offset,
            ),
            booths: BoothTracker::new(deps.booths, Arc::clone(&deps.clock), notifier),
            attendees: deps.attendees,
            clock: deps.clock,
        }
    }

    /// Build every service over `deps` with topic and report offset from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the report offset is out of range.
    pub fn from_config(deps: Dependencies, config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(deps, config.events.topic.clone(), config.report.offset()?))
    }

    /// Attendee store, for readiness checks.
    #[must_use]
    pub fn attendee_store(&self) -> &dyn AttendeeStore {
        self.attendees.as_ref()
    }

    /// Current time on the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
