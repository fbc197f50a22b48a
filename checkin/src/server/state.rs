//! Application state for the check-in HTTP server.

use crate::app::CheckInApp;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every service inside holds its collaborators
/// behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Check-in operations
    pub app: CheckInApp,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(app: CheckInApp) -> Self {
        Self { app }
    }
}
