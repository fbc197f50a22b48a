//! `sponsor_booths` and `booth_visitors` tables.

use crate::map_sqlx_error;
use chrono::{DateTime, Utc};
use eventix_core::{
    BoothId, BoothVisitor, EventId, NewBoothVisitor, NewSponsorBooth, SponsorBooth,
    SponsorBoothStore, SponsorBoothUpdate, StoreError, StoreFuture,
};
use sqlx::PgPool;

const BOOTH_COLUMNS: &str = "id, event_id, sponsor_id, name, description, location, qr_code, \
     is_active, visitor_count, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BoothRow {
    id: String,
    event_id: String,
    sponsor_id: String,
    name: String,
    description: String,
    location: String,
    qr_code: String,
    is_active: bool,
    visitor_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BoothRow> for SponsorBooth {
    type Error = StoreError;

    fn try_from(row: BoothRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BoothId::new(row.id),
            event_id: EventId::new(row.event_id),
            sponsor_id: row.sponsor_id.into(),
            name: row.name,
            description: row.description,
            location: row.location,
            qr_code: row.qr_code,
            is_active: row.is_active,
            visitor_count: u64::try_from(row.visitor_count).map_err(|_| {
                StoreError::Serialization(format!("negative visitor_count {}", row.visitor_count))
            })?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VisitorRow {
    booth_id: String,
    attendee_id: String,
    visit_time: DateTime<Utc>,
    duration: i32,
    notes: Option<String>,
}

impl TryFrom<VisitorRow> for BoothVisitor {
    type Error = StoreError;

    fn try_from(row: VisitorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            booth_id: BoothId::new(row.booth_id),
            attendee_id: row.attendee_id.into(),
            visit_time: row.visit_time,
            duration: u32::try_from(row.duration)
                .map_err(|_| StoreError::Serialization(format!("negative duration {}", row.duration)))?,
            notes: row.notes,
        })
    }
}

/// `PostgreSQL` sponsor booth store.
#[derive(Clone, Debug)]
pub struct PostgresSponsorBoothStore {
    pool: PgPool,
}

impl PostgresSponsorBoothStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SponsorBoothStore for PostgresSponsorBoothStore {
    fn create(&self, booth: NewSponsorBooth) -> StoreFuture<'_, SponsorBooth> {
        Box::pin(async move {
            let id = BoothId::generate();
            let sql = format!(
                r"
                INSERT INTO sponsor_booths (id, event_id, sponsor_id, name, description, location, qr_code, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
                RETURNING {BOOTH_COLUMNS}
                "
            );
            let row: BoothRow = sqlx::query_as(&sql)
                .bind(id.as_str())
                .bind(booth.event_id.as_str())
                .bind(booth.sponsor_id.as_str())
                .bind(&booth.name)
                .bind(&booth.description)
                .bind(&booth.location)
                .bind(&booth.qr_code)
                .bind(booth.created_at)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Failed to create sponsor booth", e))?;
            SponsorBooth::try_from(row)
        })
    }

    fn find_by_id<'a>(&'a self, id: &'a BoothId) -> StoreFuture<'a, Option<SponsorBooth>> {
        Box::pin(async move {
            let sql = format!("SELECT {BOOTH_COLUMNS} FROM sponsor_booths WHERE id = $1");
            let row: Option<BoothRow> = sqlx::query_as(&sql)
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Failed to load sponsor booth", e))?;
            row.map(SponsorBooth::try_from).transpose()
        })
    }

    fn find_by_event_id<'a>(&'a self, event_id: &'a EventId) -> StoreFuture<'a, Vec<SponsorBooth>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {BOOTH_COLUMNS} FROM sponsor_booths WHERE event_id = $1 ORDER BY created_at, id"
            );
            let rows: Vec<BoothRow> = sqlx::query_as(&sql)
                .bind(event_id.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Failed to load sponsor booths for event", e))?;
            rows.into_iter().map(SponsorBooth::try_from).collect()
        })
    }

    fn update<'a>(&'a self, id: &'a BoothId, update: SponsorBoothUpdate) -> StoreFuture<'a, SponsorBooth> {
        Box::pin(async move {
            let visitor_count = update
                .visitor_count
                .map(i64::try_from)
                .transpose()
                .map_err(|_| StoreError::Serialization("visitor_count out of range".to_string()))?;

            let sql = format!(
                r"
                UPDATE sponsor_booths SET
                    name = COALESCE($2, name),
                    description = COALESCE($3, description),
                    location = COALESCE($4, location),
                    is_active = COALESCE($5, is_active),
                    visitor_count = COALESCE($6, visitor_count),
                    updated_at = COALESCE($7, updated_at)
                WHERE id = $1
                RETURNING {BOOTH_COLUMNS}
                "
            );
            let row: Option<BoothRow> = sqlx::query_as(&sql)
                .bind(id.as_str())
                .bind(update.name)
                .bind(update.description)
                .bind(update.location)
                .bind(update.is_active)
                .bind(visitor_count)
                .bind(update.updated_at)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Failed to update sponsor booth", e))?;

            row.map(SponsorBooth::try_from)
                .transpose()?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "SponsorBooth",
                    id: id.to_string(),
                })
        })
    }

    fn add_visitor(&self, visitor: NewBoothVisitor) -> StoreFuture<'_, BoothVisitor> {
        Box::pin(async move {
            let duration = i32::try_from(visitor.duration)
                .map_err(|_| StoreError::Serialization(format!("duration {} out of range", visitor.duration)))?;

            let row: VisitorRow = sqlx::query_as(
                r"
                INSERT INTO booth_visitors (booth_id, attendee_id, visit_time, duration, notes)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING booth_id, attendee_id, visit_time, duration, notes
                ",
            )
            .bind(visitor.booth_id.as_str())
            .bind(visitor.attendee_id.as_str())
            .bind(visitor.visit_time)
            .bind(duration)
            .bind(&visitor.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to record booth visit", e))?;

            BoothVisitor::try_from(row)
        })
    }

    fn get_visitors<'a>(&'a self, booth_id: &'a BoothId) -> StoreFuture<'a, Vec<BoothVisitor>> {
        Box::pin(async move {
            let rows: Vec<VisitorRow> = sqlx::query_as(
                r"
                SELECT booth_id, attendee_id, visit_time, duration, notes
                FROM booth_visitors
                WHERE booth_id = $1
                ORDER BY visit_time, id
                ",
            )
            .bind(booth_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to load booth visitors", e))?;

            rows.into_iter().map(BoothVisitor::try_from).collect()
        })
    }
}
