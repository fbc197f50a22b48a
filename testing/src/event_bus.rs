//! In-memory event bus for testing.
//!
//! Records every publish instead of delivering it, so tests can assert on
//! exactly which notifications a workflow emitted.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on lock poisoning

use eventix_core::{AttendanceEvent, EventBus, EventBusError};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

/// Recording event bus.
///
/// Clones share the same log, so a test can keep one handle while the
/// service under test owns another.
///
/// # Example
///
/// ```
/// use eventix_testing::InMemoryEventBus;
///
/// let bus = InMemoryEventBus::new();
/// assert!(bus.published().is_empty());
///
/// bus.fail_publishes();
/// assert!(bus.is_failing());
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryEventBus {
    published: Arc<RwLock<Vec<(String, AttendanceEvent)>>>,
    failing: Arc<RwLock<bool>>,
}

impl InMemoryEventBus {
    /// Create a bus that accepts every publish
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every accepted `(topic, event)` pair, in publish order.
    #[must_use]
    pub fn published(&self) -> Vec<(String, AttendanceEvent)> {
        self.published.read().unwrap().clone()
    }

    /// Accepted events only, ignoring topics.
    #[must_use]
    pub fn events(&self) -> Vec<AttendanceEvent> {
        self.published
            .read()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Reject every subsequent publish with a transport error.
    pub fn fail_publishes(&self) {
        *self.failing.write().unwrap() = true;
    }

    /// Whether publishes are currently rejected.
    #[must_use]
    pub fn is_failing(&self) -> bool {
        *self.failing.read().unwrap()
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        self.published.write().unwrap().clear();
    }
}

impl EventBus for InMemoryEventBus {
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        event: &'a AttendanceEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), EventBusError>> + Send + 'a>> {
        Box::pin(async move {
            if self.is_failing() {
                return Err(EventBusError::PublishFailed {
                    topic: topic.to_string(),
                    reason: "broker unavailable".to_string(),
                });
            }
            self.published
                .write()
                .unwrap()
                .push((topic.to_string(), event.clone()));
            Ok(())
        })
    }
}
