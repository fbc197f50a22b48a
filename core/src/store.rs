//! Persistence seams for attendees and sponsor booths.
//!
//! The check-in workflow never talks to a database directly. It is handed an
//! `Arc<dyn AttendeeStore>` and an `Arc<dyn SponsorBoothStore>` at
//! construction and calls them at its only suspension points.
//!
//! # Implementations
//!
//! - `InMemoryAttendeeStore` / `InMemorySponsorBoothStore` in `eventix-testing`
//! - `PostgresAttendeeStore` / `PostgresSponsorBoothStore` in `eventix-postgres`
//!
//! # Dyn-compatibility
//!
//! These traits use explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` so they can be used as trait objects (`Arc<dyn AttendeeStore>`).

use crate::attendee::{Attendee, AttendeeStatus, AttendeeUpdate};
use crate::booth::{BoothVisitor, NewBoothVisitor, NewSponsorBooth, SponsorBooth, SponsorBoothUpdate};
use crate::error::StoreError;
use crate::types::{AttendeeId, BoothId, EventId};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by store methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Attendee persistence.
pub trait AttendeeStore: Send + Sync {
    /// Persist a new attendee record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the id or QR code is already taken.
    fn insert(&self, attendee: Attendee) -> StoreFuture<'_, Attendee>;

    /// Look up an attendee by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the lookup itself fails.
    fn find_by_id<'a>(&'a self, id: &'a AttendeeId) -> StoreFuture<'a, Option<Attendee>>;

    /// Look up the attendee bound to a QR code.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the lookup itself fails.
    fn find_by_qr_code<'a>(&'a self, qr_code: &'a str) -> StoreFuture<'a, Option<Attendee>>;

    /// Every attendee registered for an event, newest registration first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the query fails.
    fn find_by_event_id<'a>(&'a self, event_id: &'a EventId) -> StoreFuture<'a, Vec<Attendee>>;

    /// Apply a partial update unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when `id` is unknown.
    fn update<'a>(&'a self, id: &'a AttendeeId, update: AttendeeUpdate) -> StoreFuture<'a, Attendee>;

    /// Apply a partial update only if the stored status still equals `expected`.
    ///
    /// Returns `Ok(None)` when the status changed underneath the caller; the
    /// record is left untouched in that case.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when `id` is unknown.
    fn update_if_status<'a>(
        &'a self,
        id: &'a AttendeeId,
        expected: AttendeeStatus,
        update: AttendeeUpdate,
    ) -> StoreFuture<'a, Option<Attendee>>;

    /// Cheap connectivity check used by readiness probes.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing store is unreachable.
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

/// Sponsor booth and booth visit persistence.
pub trait SponsorBoothStore: Send + Sync {
    /// Persist a new booth; the store assigns id, counters and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the booth QR code is already taken.
    fn create(&self, booth: NewSponsorBooth) -> StoreFuture<'_, SponsorBooth>;

    /// Look up a booth by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the lookup itself fails.
    fn find_by_id<'a>(&'a self, id: &'a BoothId) -> StoreFuture<'a, Option<SponsorBooth>>;

    /// Every booth set up for an event.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the query fails.
    fn find_by_event_id<'a>(&'a self, event_id: &'a EventId) -> StoreFuture<'a, Vec<SponsorBooth>>;

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when `id` is unknown.
    fn update<'a>(&'a self, id: &'a BoothId, update: SponsorBoothUpdate) -> StoreFuture<'a, SponsorBooth>;

    /// Record a visit.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the insert fails.
    fn add_visitor(&self, visitor: NewBoothVisitor) -> StoreFuture<'_, BoothVisitor>;

    /// Every visit recorded for a booth, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the query fails.
    fn get_visitors<'a>(&'a self, booth_id: &'a BoothId) -> StoreFuture<'a, Vec<BoothVisitor>>;
}
