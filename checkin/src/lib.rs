//! # Check-In Service
//!
//! Attendee check-in, attendance reporting and sponsor booth tracking for
//! Eventix events.
//!
//! ## Modules
//!
//! - [`validator`]: read-only QR code validation
//! - [`check_in`]: the check-in state machine (check in, check out, cancel)
//! - [`attendance`]: attendance report aggregation
//! - [`booth`]: sponsor booths and visit statistics
//! - [`events`]: best-effort downstream notifications
//! - [`app`]: wiring the services from injected stores, clock and bus
//! - [`api`] / [`server`]: the Axum HTTP surface
//! - [`config`] / [`metrics`]: environment configuration and Prometheus metrics
//!
//! ## Example
//!
//! ```no_run
//! use checkin_service::app::{CheckInApp, Dependencies};
//! use checkin_service::check_in::CheckInRequest;
//! use checkin_service::events::LogEventBus;
//! use chrono::FixedOffset;
//! use eventix_core::environment::SystemClock;
//! use eventix_core::{AttendeeStore, SponsorBoothStore};
//! use std::sync::Arc;
//!
//! # async fn run(attendees: Arc<dyn AttendeeStore>, booths: Arc<dyn SponsorBoothStore>) -> Result<(), Box<dyn std::error::Error>> {
//! let app = CheckInApp::new(
//!     Dependencies {
//!         attendees,
//!         booths,
//!         clock: Arc::new(SystemClock),
//!         event_bus: Arc::new(LogEventBus),
//!     },
//!     "checkin-events",
//!     FixedOffset::east_opt(0).ok_or("offset")?,
//! );
//!
//! let outcome = app
//!     .check_in
//!     .check_in(CheckInRequest {
//!         qr_code: "Q1".to_string(),
//!         event_id: None,
//!         checked_in_by: "staff1".to_string(),
//!         location: Some("Door A".to_string()),
//!     })
//!     .await?;
//! println!("{}", outcome.message);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod app;
pub mod attendance;
pub mod booth;
pub mod check_in;
pub mod config;
pub mod events;
pub mod metrics;
pub mod server;
pub mod validator;

pub use app::{CheckInApp, Dependencies};
pub use config::Config;
