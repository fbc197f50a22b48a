//! `PostgreSQL` stores for the Eventix check-in service.
//!
//! This crate implements the [`AttendeeStore`](eventix_core::AttendeeStore) and
//! [`SponsorBoothStore`](eventix_core::SponsorBoothStore) traits from
//! `eventix-core` on top of a shared sqlx [`PgPool`]:
//!
//! - Unique QR codes enforced by the database
//! - Status compare-and-swap for check-in writes
//! - Connection pooling with configurable limits
//! - Embedded migrations
//!
//! # Example
//!
//! ```no_run
//! use eventix_postgres::{connect, migrate, PoolSettings, PostgresAttendeeStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = connect("postgres://localhost/checkin", &PoolSettings::default()).await?;
//! migrate(&pool).await?;
//! let attendees = PostgresAttendeeStore::new(pool);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attendees;
mod booths;

pub use attendees::PostgresAttendeeStore;
pub use booths::PostgresSponsorBoothStore;

use eventix_core::StoreError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Connection pool limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum open connections
    pub max_connections: u32,
    /// Connections kept open when idle
    pub min_connections: u32,
    /// How long to wait for a connection before failing
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Open a connection pool.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the database cannot be reached.
pub async fn connect(database_url: &str, settings: &PoolSettings) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.connect_timeout)
        .connect(database_url)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to connect: {e}")))?;

    tracing::info!(
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        "PostgreSQL pool ready"
    );

    Ok(pool)
}

/// Run the embedded migrations (`attendees`, `sponsor_booths`, `booth_visitors`).
///
/// # Errors
///
/// Returns [`StoreError::Database`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
    Ok(())
}

/// Map a sqlx error, turning unique violations into [`StoreError::Conflict`].
fn map_sqlx_error(context: &str, error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &error {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(format!("{context}: {}", db_err.message()));
        }
    }
    StoreError::Database(format!("{context}: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_settings() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.min_connections, 2);
        assert_eq!(settings.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn non_database_errors_map_to_database() {
        let err = map_sqlx_error("Failed to load attendee", sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(msg) if msg.starts_with("Failed to load attendee")));
    }
}
