//! # Eventix Core
//!
//! Domain types and collaborator traits for the Eventix check-in service.
//!
//! This crate holds everything the check-in workflow needs to reason about an
//! attendee without touching I/O:
//!
//! - **Identifiers**: string newtypes for attendees, events, users, tickets and booths
//! - **Attendee**: the registration record and its closed [`AttendeeStatus`] lifecycle
//! - **Sponsor booths**: booth records and visit records
//! - **Stores**: [`AttendeeStore`] and [`SponsorBoothStore`], the persistence seams
//! - **Event bus**: [`EventBus`] for downstream notifications
//! - **Environment**: [`Clock`](environment::Clock) for injected time
//!
//! ## Lifecycle
//!
//! ```text
//!              check in               check out
//! REGISTERED ───────────▶ CHECKED_IN ───────────▶ CHECKED_OUT
//!     │                    │    ▲                      │
//!     │ cancel      cancel │    └──────── re-entry ────┘
//!     ▼                    ▼
//!  CANCELLED ◀─────────────┘
//! ```
//!
//! CANCELLED is terminal. Re-entry moves a CHECKED_OUT attendee back to
//! CHECKED_IN.
//!
//! ## Example
//!
//! ```
//! use eventix_core::attendee::AttendeeStatus;
//!
//! assert!(AttendeeStatus::Registered.can_transition_to(AttendeeStatus::CheckedIn));
//! assert!(!AttendeeStatus::Cancelled.can_transition_to(AttendeeStatus::CheckedIn));
//! ```

pub mod attendee;
pub mod booth;
pub mod error;
pub mod event_bus;
pub mod store;
pub mod types;

pub use attendee::{Attendee, AttendeeStatus, AttendeeUpdate, Patch, SponsorBoothVisit};
pub use booth::{BoothVisitor, NewBoothVisitor, NewSponsorBooth, SponsorBooth, SponsorBoothUpdate};
pub use error::{CheckInError, StoreError};
pub use event_bus::{AttendanceEvent, EventBus, EventBusError};
pub use store::{AttendeeStore, SponsorBoothStore, StoreFuture};
pub use types::{AttendeeId, BoothId, EventId, SponsorId, TicketId, UserId};

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

/// Environment module - injected dependencies that are not stores
///
/// Everything time-dependent in the check-in workflow asks a [`Clock`]
/// instead of calling `Utc::now()` directly, so tests can pin time.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use eventix_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
