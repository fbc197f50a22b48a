//! Publishing attendance notifications.
//!
//! Services hand events to a [`Notifier`] after the store has accepted a
//! write. A refused publish is logged and counted; the write stands.

use crate::metrics;
use eventix_core::{AttendanceEvent, EventBus, EventBusError};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Event bus that writes each notification to the log.
///
/// Used by the server binary when no broker is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventBus;

impl EventBus for LogEventBus {
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        event: &'a AttendanceEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), EventBusError>> + Send + 'a>> {
        Box::pin(async move {
            let payload = event.to_json()?;
            tracing::info!(
                topic,
                event_type = event.event_type(),
                payload = %String::from_utf8_lossy(&payload),
                "Attendance event published"
            );
            Ok(())
        })
    }
}

/// Best-effort publisher bound to one topic.
#[derive(Clone)]
pub struct Notifier {
    bus: Arc<dyn EventBus>,
    topic: String,
}

impl Notifier {
    /// Publish to `topic` through `bus`.
    #[must_use]
    pub fn new(bus: Arc<dyn EventBus>, topic: impl Into<String>) -> Self {
        Self {
            bus,
            topic: topic.into(),
        }
    }

    /// Topic events go to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish `event`, logging instead of failing when the bus refuses it.
    pub async fn notify(&self, event: AttendanceEvent) {
        if let Err(error) = self.bus.publish(&self.topic, &event).await {
            tracing::warn!(
                topic = %self.topic,
                event_type = event.event_type(),
                error = %error,
                "Failed to publish attendance event"
            );
            metrics::record_publish_failure(event.event_type());
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").field("topic", &self.topic).finish_non_exhaustive()
    }
}
