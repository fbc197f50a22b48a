//! `attendees` table.

use crate::map_sqlx_error;
use chrono::{DateTime, Utc};
use eventix_core::{
    Attendee, AttendeeId, AttendeeStatus, AttendeeStore, AttendeeUpdate, EventId, SponsorBoothVisit,
    StoreError, StoreFuture,
};
use sqlx::types::Json;
use sqlx::PgPool;

const ATTENDEE_COLUMNS: &str = "id, event_id, user_id, ticket_id, qr_code, status, check_in_time, \
     check_out_time, sponsor_booth_visits, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AttendeeRow {
    id: String,
    event_id: String,
    user_id: String,
    ticket_id: String,
    qr_code: String,
    status: String,
    check_in_time: Option<DateTime<Utc>>,
    check_out_time: Option<DateTime<Utc>>,
    sponsor_booth_visits: Json<Vec<SponsorBoothVisit>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AttendeeRow> for Attendee {
    type Error = StoreError;

    fn try_from(row: AttendeeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AttendeeId::new(row.id),
            event_id: EventId::new(row.event_id),
            user_id: row.user_id.into(),
            ticket_id: row.ticket_id.into(),
            qr_code: row.qr_code,
            status: AttendeeStatus::parse(&row.status).map_err(StoreError::Serialization)?,
            check_in_time: row.check_in_time,
            check_out_time: row.check_out_time,
            sponsor_booth_visits: row.sponsor_booth_visits.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `PostgreSQL` attendee store.
///
/// Partial updates are a single `UPDATE … RETURNING` statement. Nullable
/// timestamp columns are guarded by a "touch" flag so that [`Patch::Clear`]
/// and [`Patch::Unchanged`] stay distinct.
///
/// [`Patch::Clear`]: eventix_core::Patch::Clear
/// [`Patch::Unchanged`]: eventix_core::Patch::Unchanged
#[derive(Clone, Debug)]
pub struct PostgresAttendeeStore {
    pool: PgPool,
}

impl PostgresAttendeeStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn exists(&self, id: &AttendeeId) -> Result<bool, StoreError> {
        let found: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM attendees WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to look up attendee", e))?;
        Ok(found.is_some())
    }

    /// Shared `UPDATE` for both the unconditional and compare-and-swap paths.
    async fn apply_update(
        &self,
        id: &AttendeeId,
        expected: Option<AttendeeStatus>,
        update: AttendeeUpdate,
    ) -> Result<Option<Attendee>, StoreError> {
        let sql = format!(
            r"
            UPDATE attendees SET
                status = COALESCE($2, status),
                check_in_time = CASE WHEN $3 THEN $4 ELSE check_in_time END,
                check_out_time = CASE WHEN $5 THEN $6 ELSE check_out_time END,
                updated_at = COALESCE($7, updated_at)
            WHERE id = $1 AND ($8::TEXT IS NULL OR status = $8)
            RETURNING {ATTENDEE_COLUMNS}
            "
        );

        let row: Option<AttendeeRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .bind(update.status.map(|s| s.as_str()))
            .bind(!update.check_in_time.is_unchanged())
            .bind(update.check_in_time.value().copied())
            .bind(!update.check_out_time.is_unchanged())
            .bind(update.check_out_time.value().copied())
            .bind(update.updated_at)
            .bind(expected.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to update attendee", e))?;

        row.map(Attendee::try_from).transpose()
    }
}

impl AttendeeStore for PostgresAttendeeStore {
    fn insert(&self, attendee: Attendee) -> StoreFuture<'_, Attendee> {
        Box::pin(async move {
            let sql = format!(
                r"
                INSERT INTO attendees ({ATTENDEE_COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING {ATTENDEE_COLUMNS}
                "
            );
            let row: AttendeeRow = sqlx::query_as(&sql)
                .bind(attendee.id.as_str())
                .bind(attendee.event_id.as_str())
                .bind(attendee.user_id.as_str())
                .bind(attendee.ticket_id.as_str())
                .bind(&attendee.qr_code)
                .bind(attendee.status.as_str())
                .bind(attendee.check_in_time)
                .bind(attendee.check_out_time)
                .bind(Json(&attendee.sponsor_booth_visits))
                .bind(attendee.created_at)
                .bind(attendee.updated_at)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Failed to insert attendee", e))?;

            tracing::debug!(attendee_id = %attendee.id, event_id = %attendee.event_id, "Attendee inserted");
            Attendee::try_from(row)
        })
    }

    fn find_by_id<'a>(&'a self, id: &'a AttendeeId) -> StoreFuture<'a, Option<Attendee>> {
        Box::pin(async move {
            let sql = format!("SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE id = $1");
            let row: Option<AttendeeRow> = sqlx::query_as(&sql)
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Failed to load attendee", e))?;
            row.map(Attendee::try_from).transpose()
        })
    }

    fn find_by_qr_code<'a>(&'a self, qr_code: &'a str) -> StoreFuture<'a, Option<Attendee>> {
        Box::pin(async move {
            let sql = format!("SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE qr_code = $1");
            let row: Option<AttendeeRow> = sqlx::query_as(&sql)
                .bind(qr_code)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Failed to load attendee by QR code", e))?;
            row.map(Attendee::try_from).transpose()
        })
    }

    fn find_by_event_id<'a>(&'a self, event_id: &'a EventId) -> StoreFuture<'a, Vec<Attendee>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE event_id = $1 ORDER BY created_at DESC, id"
            );
            let rows: Vec<AttendeeRow> = sqlx::query_as(&sql)
                .bind(event_id.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Failed to load attendees for event", e))?;
            rows.into_iter().map(Attendee::try_from).collect()
        })
    }

    fn update<'a>(&'a self, id: &'a AttendeeId, update: AttendeeUpdate) -> StoreFuture<'a, Attendee> {
        Box::pin(async move {
            self.apply_update(id, None, update)
                .await?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "Attendee",
                    id: id.to_string(),
                })
        })
    }

    fn update_if_status<'a>(
        &'a self,
        id: &'a AttendeeId,
        expected: AttendeeStatus,
        update: AttendeeUpdate,
    ) -> StoreFuture<'a, Option<Attendee>> {
        Box::pin(async move {
            if let Some(attendee) = self.apply_update(id, Some(expected), update).await? {
                return Ok(Some(attendee));
            }

            // Zero rows: either the status moved or the id never existed.
            if self.exists(id).await? {
                tracing::debug!(attendee_id = %id, expected = %expected, "Status changed before write");
                metrics::counter!("attendee_store.cas_conflicts").increment(1);
                Ok(None)
            } else {
                Err(StoreError::NotFound {
                    entity: "Attendee",
                    id: id.to_string(),
                })
            }
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Ping failed", e))?;
            Ok(())
        })
    }
}
