//! # Eventix Testing
//!
//! Testing utilities for the Eventix check-in service.
//!
//! This crate provides:
//! - [`FixedClock`]: deterministic, manually advanced time
//! - [`InMemoryAttendeeStore`] / [`InMemorySponsorBoothStore`]: `HashMap`-backed
//!   stores that count writes, so tests can assert "no store write happened"
//! - [`InMemoryEventBus`]: records every published notification
//! - [`fixtures`]: builders for attendees and booths
//!
//! ## Example
//!
//! ```
//! use eventix_testing::{fixtures::AttendeeBuilder, InMemoryAttendeeStore};
//! use eventix_core::AttendeeStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryAttendeeStore::new();
//! store.insert(AttendeeBuilder::new("Q1", "E1").build()).await?;
//!
//! assert!(store.find_by_qr_code("Q1").await?.is_some());
//! assert_eq!(store.write_count(), 0);
//! # Ok(())
//! # }
//! ```

pub mod event_bus;
pub mod fixtures;
pub mod stores;

use chrono::{DateTime, Utc};
use eventix_core::environment::Clock;

/// Mock implementations of environment traits.
pub mod mocks {
    #![allow(clippy::unwrap_used)] // Lock poisoning only follows a panicking test

    use super::{Clock, DateTime, Utc};
    use chrono::Duration;
    use std::sync::{Arc, RwLock};

    /// Clock for deterministic tests.
    ///
    /// Returns the same instant until moved with [`advance`](Self::advance) or
    /// [`set`](Self::set). Clones share the same time, so a test can keep a
    /// handle while the service under test owns another.
    ///
    /// # Example
    ///
    /// ```
    /// use eventix_testing::mocks::FixedClock;
    /// use eventix_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// assert_eq!(time1, clock.now());
    ///
    /// clock.advance(Duration::minutes(5));
    /// assert_eq!(clock.now() - time1, Duration::minutes(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<RwLock<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(RwLock::new(time)),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: Duration) {
            let mut time = self.time.write().unwrap();
            *time += by;
        }

        /// Jump the clock to an absolute time.
        pub fn set(&self, to: DateTime<Utc>) {
            *self.time.write().unwrap() = to;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.read().unwrap()
        }
    }

    /// Create a default fixed clock for tests, starting at
    /// [`fixture_time`](crate::fixtures::fixture_time) (2025-06-01 09:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(crate::fixtures::fixture_time())
    }
}

// Re-export commonly used items
pub use event_bus::InMemoryEventBus;
pub use mocks::{test_clock, FixedClock};
pub use stores::{InMemoryAttendeeStore, InMemorySponsorBoothStore};
