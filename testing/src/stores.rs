//! In-memory store implementations for fast, deterministic tests.
//!
//! Both stores count the writes they accept. Check-in tests lean on this to
//! prove that idempotent and rejected paths never touch the store.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on lock poisoning

use eventix_core::{
    Attendee, AttendeeId, AttendeeStatus, AttendeeStore, AttendeeUpdate, BoothId, BoothVisitor,
    EventId, NewBoothVisitor, NewSponsorBooth, SponsorBooth, SponsorBoothStore,
    SponsorBoothUpdate, StoreError, StoreFuture,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

// ============================================================================
// Attendees
// ============================================================================

/// `HashMap`-backed attendee store.
///
/// Lookups by QR code scan all records; fine at test scale.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAttendeeStore {
    attendees: Arc<RwLock<HashMap<AttendeeId, Attendee>>>,
    writes: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
    /// Applied just before the next conditional write, to simulate a
    /// competing writer landing between read and write.
    interleaved: Arc<Mutex<Option<(AttendeeId, AttendeeUpdate)>>>,
    failure: Arc<Mutex<Option<StoreError>>>,
}

impl InMemoryAttendeeStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with attendees.
    ///
    /// Seeding does not count as a write.
    #[must_use]
    pub fn with_attendees(attendees: impl IntoIterator<Item = Attendee>) -> Self {
        let store = Self::new();
        {
            let mut map = store.attendees.write().unwrap();
            for attendee in attendees {
                map.insert(attendee.id.clone(), attendee);
            }
        }
        store
    }

    /// Number of accepted `update` / `update_if_status` calls.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of lookups served.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Current state of a record, bypassing counters.
    #[must_use]
    pub fn snapshot(&self, id: &AttendeeId) -> Option<Attendee> {
        self.attendees.read().unwrap().get(id).cloned()
    }

    /// Number of stored attendees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attendees.read().unwrap().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attendees.read().unwrap().is_empty()
    }

    /// Apply `update` to `id` right before the next `update_if_status` runs.
    pub fn interleave_before_next_write(&self, id: AttendeeId, update: AttendeeUpdate) {
        *self.interleaved.lock().unwrap() = Some((id, update));
    }

    /// Make every subsequent call fail with `error` until cleared.
    pub fn fail_with(&self, error: StoreError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// Stop injecting failures.
    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn not_found(id: &AttendeeId) -> StoreError {
        StoreError::NotFound {
            entity: "Attendee",
            id: id.to_string(),
        }
    }
}

impl AttendeeStore for InMemoryAttendeeStore {
    fn insert(&self, attendee: Attendee) -> StoreFuture<'_, Attendee> {
        Box::pin(async move {
            self.check_failure()?;
            let mut map = self.attendees.write().unwrap();
            if map.contains_key(&attendee.id) {
                return Err(StoreError::Conflict(format!(
                    "attendee {} already exists",
                    attendee.id
                )));
            }
            if map.values().any(|a| a.qr_code == attendee.qr_code) {
                return Err(StoreError::Conflict(format!(
                    "QR code {} already assigned",
                    attendee.qr_code
                )));
            }
            map.insert(attendee.id.clone(), attendee.clone());
            Ok(attendee)
        })
    }

    fn find_by_id<'a>(&'a self, id: &'a AttendeeId) -> StoreFuture<'a, Option<Attendee>> {
        Box::pin(async move {
            self.check_failure()?;
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.attendees.read().unwrap().get(id).cloned())
        })
    }

    fn find_by_qr_code<'a>(&'a self, qr_code: &'a str) -> StoreFuture<'a, Option<Attendee>> {
        Box::pin(async move {
            self.check_failure()?;
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .attendees
                .read()
                .unwrap()
                .values()
                .find(|a| a.qr_code == qr_code)
                .cloned())
        })
    }

    fn find_by_event_id<'a>(&'a self, event_id: &'a EventId) -> StoreFuture<'a, Vec<Attendee>> {
        Box::pin(async move {
            self.check_failure()?;
            self.reads.fetch_add(1, Ordering::SeqCst);
            let mut attendees: Vec<Attendee> = self
                .attendees
                .read()
                .unwrap()
                .values()
                .filter(|a| &a.event_id == event_id)
                .cloned()
                .collect();
            attendees.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
            Ok(attendees)
        })
    }

    fn update<'a>(&'a self, id: &'a AttendeeId, update: AttendeeUpdate) -> StoreFuture<'a, Attendee> {
        Box::pin(async move {
            self.check_failure()?;
            let mut map = self.attendees.write().unwrap();
            let attendee = map.get_mut(id).ok_or_else(|| Self::not_found(id))?;
            update.apply(attendee);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(attendee.clone())
        })
    }

    fn update_if_status<'a>(
        &'a self,
        id: &'a AttendeeId,
        expected: AttendeeStatus,
        update: AttendeeUpdate,
    ) -> StoreFuture<'a, Option<Attendee>> {
        Box::pin(async move {
            self.check_failure()?;
            let interleaved = self.interleaved.lock().unwrap().take();
            let mut map = self.attendees.write().unwrap();

            if let Some((other_id, other_update)) = interleaved {
                if let Some(other) = map.get_mut(&other_id) {
                    other_update.apply(other);
                }
            }

            let attendee = map.get_mut(id).ok_or_else(|| Self::not_found(id))?;
            if attendee.status != expected {
                return Ok(None);
            }
            update.apply(attendee);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(Some(attendee.clone()))
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.check_failure() })
    }
}

// ============================================================================
// Sponsor booths
// ============================================================================

/// `HashMap`-backed sponsor booth store with an append-only visit log.
#[derive(Clone, Debug, Default)]
pub struct InMemorySponsorBoothStore {
    booths: Arc<RwLock<HashMap<BoothId, SponsorBooth>>>,
    visitors: Arc<RwLock<Vec<BoothVisitor>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemorySponsorBoothStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with booths. Seeding does not count as a write.
    #[must_use]
    pub fn with_booths(booths: impl IntoIterator<Item = SponsorBooth>) -> Self {
        let store = Self::new();
        {
            let mut map = store.booths.write().unwrap();
            for booth in booths {
                map.insert(booth.id.clone(), booth);
            }
        }
        store
    }

    /// Number of accepted writes (creates, updates and visits).
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current state of a booth, bypassing counters.
    #[must_use]
    pub fn snapshot(&self, id: &BoothId) -> Option<SponsorBooth> {
        self.booths.read().unwrap().get(id).cloned()
    }

    /// Total visit records across all booths.
    #[must_use]
    pub fn visit_count(&self) -> usize {
        self.visitors.read().unwrap().len()
    }
}

impl SponsorBoothStore for InMemorySponsorBoothStore {
    fn create(&self, booth: NewSponsorBooth) -> StoreFuture<'_, SponsorBooth> {
        Box::pin(async move {
            let mut map = self.booths.write().unwrap();
            if map.values().any(|b| b.qr_code == booth.qr_code) {
                return Err(StoreError::Conflict(format!(
                    "booth QR code {} already assigned",
                    booth.qr_code
                )));
            }
            let now = booth.created_at;
            let created = SponsorBooth {
                id: BoothId::generate(),
                event_id: booth.event_id,
                sponsor_id: booth.sponsor_id,
                name: booth.name,
                description: booth.description,
                location: booth.location,
                qr_code: booth.qr_code,
                is_active: true,
                visitor_count: 0,
                created_at: now,
                updated_at: now,
            };
            map.insert(created.id.clone(), created.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(created)
        })
    }

    fn find_by_id<'a>(&'a self, id: &'a BoothId) -> StoreFuture<'a, Option<SponsorBooth>> {
        Box::pin(async move { Ok(self.booths.read().unwrap().get(id).cloned()) })
    }

    fn find_by_event_id<'a>(&'a self, event_id: &'a EventId) -> StoreFuture<'a, Vec<SponsorBooth>> {
        Box::pin(async move {
            Ok(self
                .booths
                .read()
                .unwrap()
                .values()
                .filter(|b| &b.event_id == event_id)
                .cloned()
                .collect())
        })
    }

    fn update<'a>(&'a self, id: &'a BoothId, update: SponsorBoothUpdate) -> StoreFuture<'a, SponsorBooth> {
        Box::pin(async move {
            let mut map = self.booths.write().unwrap();
            let booth = map.get_mut(id).ok_or_else(|| StoreError::NotFound {
                entity: "SponsorBooth",
                id: id.to_string(),
            })?;
            update.apply(booth);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(booth.clone())
        })
    }

    fn add_visitor(&self, visitor: NewBoothVisitor) -> StoreFuture<'_, BoothVisitor> {
        Box::pin(async move {
            let visitor = BoothVisitor::from(visitor);
            self.visitors.write().unwrap().push(visitor.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(visitor)
        })
    }

    fn get_visitors<'a>(&'a self, booth_id: &'a BoothId) -> StoreFuture<'a, Vec<BoothVisitor>> {
        Box::pin(async move {
            Ok(self
                .visitors
                .read()
                .unwrap()
                .iter()
                .filter(|v| &v.booth_id == booth_id)
                .cloned()
                .collect())
        })
    }
}
