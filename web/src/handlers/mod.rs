//! HTTP request handlers shared across services.

pub mod health;

pub use health::{health_check, readiness_check, HealthCheck, HealthStatus};
