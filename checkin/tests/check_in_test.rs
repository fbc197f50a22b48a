//! Check-in state machine against the in-memory stores.

#![allow(clippy::unwrap_used, clippy::panic)] // Test code can use unwrap/panic

use checkin_service::app::{CheckInApp, Dependencies};
use checkin_service::check_in::{CheckInRequest, CheckOutRequest};
use chrono::{Duration, FixedOffset};
use eventix_core::{
    AttendanceEvent, AttendeeId, AttendeeStatus, AttendeeUpdate, CheckInError, EventId, Patch,
};
use eventix_testing::fixtures::{fixture_time, AttendeeBuilder};
use eventix_testing::{
    test_clock, FixedClock, InMemoryAttendeeStore, InMemoryEventBus, InMemorySponsorBoothStore,
};
use proptest::prelude::*;
use std::sync::Arc;

struct Harness {
    app: CheckInApp,
    store: InMemoryAttendeeStore,
    bus: InMemoryEventBus,
    clock: FixedClock,
}

fn harness(store: InMemoryAttendeeStore) -> Harness {
    let bus = InMemoryEventBus::new();
    let clock = test_clock();
    let app = CheckInApp::new(
        Dependencies {
            attendees: Arc::new(store.clone()),
            booths: Arc::new(InMemorySponsorBoothStore::new()),
            clock: Arc::new(clock.clone()),
            event_bus: Arc::new(bus.clone()),
        },
        "checkin-events",
        FixedOffset::east_opt(0).unwrap(),
    );
    Harness {
        app,
        store,
        bus,
        clock,
    }
}

fn scan(qr_code: &str, event_id: Option<&str>) -> CheckInRequest {
    CheckInRequest {
        qr_code: qr_code.to_string(),
        event_id: event_id.map(EventId::new),
        checked_in_by: "staff1".to_string(),
        location: Some("Door A".to_string()),
    }
}

fn exit(qr_code: &str) -> CheckOutRequest {
    CheckOutRequest {
        qr_code: qr_code.to_string(),
        event_id: Some(EventId::new("E1")),
        checked_out_by: "staff1".to_string(),
    }
}

fn q1() -> AttendeeId {
    AttendeeId::new("att-Q1")
}

// ============================================================================
// Check-in
// ============================================================================

#[tokio::test]
async fn registered_attendee_checks_in() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").build(),
    ]));

    let outcome = h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap();

    assert_eq!(outcome.attendee.status, AttendeeStatus::CheckedIn);
    assert_eq!(outcome.attendee.check_in_time, Some(fixture_time()));
    assert_eq!(outcome.attendee.updated_at, fixture_time());
    assert_eq!(
        outcome.message,
        "Successfully checked in attendee user-Q1 for event E1"
    );
    assert_eq!(h.store.write_count(), 1);
    assert_eq!(h.store.snapshot(&q1()).unwrap(), outcome.attendee);
}

#[tokio::test]
async fn check_in_publishes_event() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").build(),
    ]));

    h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap();

    let published = h.bus.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, "checkin-events");
    match &published[0].1 {
        AttendanceEvent::AttendeeCheckedIn {
            attendee_id,
            checked_in_by,
            location,
            checked_in_at,
            ..
        } => {
            assert_eq!(attendee_id, &q1());
            assert_eq!(checked_in_by, "staff1");
            assert_eq!(location.as_deref(), Some("Door A"));
            assert_eq!(*checked_in_at, fixture_time());
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn second_scan_is_idempotent_without_write() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").build(),
    ]));
    let first = h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap();

    h.clock.advance(Duration::minutes(5));
    let second = h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap();

    assert_eq!(second.attendee, first.attendee);
    assert_eq!(
        second.message,
        "Attendee user-Q1 is already checked in at 2025-06-01T09:00:00Z"
    );
    assert_eq!(h.store.write_count(), 1);
    assert_eq!(h.bus.published().len(), 1);
}

#[tokio::test]
async fn cancelled_attendee_is_rejected_without_write() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").cancelled().build(),
    ]));

    let err = h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap_err();

    assert_eq!(err, CheckInError::validation("Cannot check in cancelled attendee"));
    assert_eq!(h.store.write_count(), 0);
    assert!(h.bus.published().is_empty());
}

#[tokio::test]
async fn wrong_event_is_rejected() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").build(),
    ]));

    let err = h.app.check_in.check_in(scan("Q1", Some("E2"))).await.unwrap_err();

    assert_eq!(err, CheckInError::validation("QR code is not valid for this event"));
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn event_guard_is_skipped_without_event() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").build(),
    ]));

    let outcome = h.app.check_in.check_in(scan("Q1", None)).await.unwrap();
    assert_eq!(outcome.attendee.status, AttendeeStatus::CheckedIn);
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let h = harness(InMemoryAttendeeStore::new());

    let err = h.app.check_in.check_in(scan("Q9", Some("E1"))).await.unwrap_err();

    assert_eq!(err, CheckInError::not_found("Attendee", "Q9"));
}

#[tokio::test]
async fn missing_fields_are_invalid_arguments() {
    let h = harness(InMemoryAttendeeStore::new());

    let mut request = scan("Q1", Some("E1"));
    request.checked_in_by = "   ".to_string();
    let err = h.app.check_in.check_in(request).await.unwrap_err();

    assert_eq!(
        err,
        CheckInError::invalid_argument("Missing required fields: qrCode, checkedInBy")
    );
    assert_eq!(h.store.read_count(), 0);
}

#[tokio::test]
async fn store_failure_surfaces_as_store_error() {
    let store = InMemoryAttendeeStore::with_attendees([AttendeeBuilder::new("Q1", "E1").build()]);
    store.fail_with(eventix_core::StoreError::Database("connection reset".to_string()));
    let h = harness(store);

    let err = h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap_err();
    assert!(matches!(err, CheckInError::Store(_)));
}

#[tokio::test]
async fn publish_failure_does_not_fail_check_in() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").build(),
    ]));
    h.bus.fail_publishes();

    let outcome = h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap();

    assert_eq!(outcome.attendee.status, AttendeeStatus::CheckedIn);
    assert_eq!(h.store.write_count(), 1);
}

// ============================================================================
// Concurrent writers
// ============================================================================

#[tokio::test]
async fn losing_a_race_to_another_check_in_is_idempotent() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").build(),
    ]));
    let earlier = fixture_time() - Duration::seconds(2);
    h.store.interleave_before_next_write(
        q1(),
        AttendeeUpdate {
            status: Some(AttendeeStatus::CheckedIn),
            check_in_time: Patch::Set(earlier),
            ..AttendeeUpdate::default()
        },
    );

    let outcome = h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap();

    assert_eq!(outcome.attendee.check_in_time, Some(earlier));
    assert!(outcome.message.contains("is already checked in"));
    assert_eq!(h.store.write_count(), 0);
    assert!(h.bus.published().is_empty());
}

#[tokio::test]
async fn losing_a_race_to_a_cancellation_is_rejected() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").build(),
    ]));
    h.store.interleave_before_next_write(
        q1(),
        AttendeeUpdate {
            status: Some(AttendeeStatus::Cancelled),
            ..AttendeeUpdate::default()
        },
    );

    let err = h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap_err();

    assert_eq!(err, CheckInError::validation("Cannot check in cancelled attendee"));
    assert_eq!(h.store.snapshot(&q1()).unwrap().status, AttendeeStatus::Cancelled);
}

// ============================================================================
// Check-out and re-entry
// ============================================================================

#[tokio::test]
async fn check_out_then_re_enter_keeps_last_exit() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").build(),
    ]));
    h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap();

    h.clock.advance(Duration::hours(1));
    let out = h.app.check_in.check_out(exit("Q1")).await.unwrap();
    assert_eq!(out.attendee.status, AttendeeStatus::CheckedOut);
    let left_at = out.attendee.check_out_time.unwrap();
    assert_eq!(left_at, fixture_time() + Duration::hours(1));
    assert_eq!(
        out.message,
        "Successfully checked out attendee user-Q1 from event E1"
    );

    h.clock.advance(Duration::minutes(30));
    let back = h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap();
    assert_eq!(back.attendee.status, AttendeeStatus::CheckedIn);
    assert_eq!(back.attendee.check_in_time, Some(left_at + Duration::minutes(30)));
    assert_eq!(back.attendee.check_out_time, Some(left_at));

    let types: Vec<_> = h.bus.events().iter().map(AttendanceEvent::event_type).collect();
    assert_eq!(
        types,
        vec!["attendee_checked_in", "attendee_checked_out", "attendee_checked_in"]
    );
}

#[tokio::test]
async fn check_out_requires_check_in() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").build(),
    ]));

    let err = h.app.check_in.check_out(exit("Q1")).await.unwrap_err();

    assert_eq!(err, CheckInError::validation("Attendee is not checked in"));
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn repeated_check_out_is_idempotent() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1")
            .checked_out_at(fixture_time() - Duration::hours(2), fixture_time() - Duration::hours(1))
            .build(),
    ]));

    let outcome = h.app.check_in.check_out(exit("Q1")).await.unwrap();

    assert!(outcome.message.starts_with("Attendee user-Q1 is already checked out at"));
    assert_eq!(h.store.write_count(), 0);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn cancelling_clears_check_in_time() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").checked_in().build(),
    ]));

    let outcome = h
        .app
        .check_in
        .cancel(&q1(), Some("Refunded".to_string()))
        .await
        .unwrap();

    assert_eq!(outcome.attendee.status, AttendeeStatus::Cancelled);
    assert_eq!(outcome.attendee.check_in_time, None);
    assert!(outcome.attendee.check_in_time_consistent());
    match h.bus.events().as_slice() {
        [AttendanceEvent::RegistrationCancelled { reason, .. }] => {
            assert_eq!(reason.as_deref(), Some("Refunded"));
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[tokio::test]
async fn cancelling_twice_is_a_no_op() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").cancelled().build(),
    ]));

    let outcome = h.app.check_in.cancel(&q1(), None).await.unwrap();

    assert!(outcome.message.contains("already cancelled"));
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn checked_out_attendee_cannot_be_cancelled() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1")
            .checked_out_at(fixture_time(), fixture_time())
            .build(),
    ]));

    let err = h.app.check_in.cancel(&q1(), None).await.unwrap_err();
    assert!(matches!(err, CheckInError::Validation(_)));
}

#[tokio::test]
async fn cancelling_unknown_attendee_is_not_found() {
    let h = harness(InMemoryAttendeeStore::new());

    let err = h
        .app
        .check_in
        .cancel(&AttendeeId::new("nobody"), None)
        .await
        .unwrap_err();
    assert_eq!(err, CheckInError::not_found("Attendee", "nobody"));
}

// ============================================================================
// Validation round trip
// ============================================================================

#[tokio::test]
async fn validate_check_in_validate() {
    let h = harness(InMemoryAttendeeStore::with_attendees([
        AttendeeBuilder::new("Q1", "E1").build(),
    ]));
    let e1 = EventId::new("E1");

    let before = h.app.validator.validate("Q1", &e1).await.unwrap();
    assert!(before.is_valid);
    assert_eq!(before.message, "QR code is valid and ready for check-in");

    h.app.check_in.check_in(scan("Q1", Some("E1"))).await.unwrap();

    let after = h.app.validator.validate("Q1", &e1).await.unwrap();
    assert!(after.is_valid);
    assert_eq!(after.status, Some(AttendeeStatus::CheckedIn));
    assert_eq!(after.message, "Attendee is already checked in");
    assert_eq!(h.store.write_count(), 1);
}

// ============================================================================
// Properties
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    CheckIn,
    CheckOut,
    Cancel,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::CheckIn), Just(Op::CheckOut), Just(Op::Cancel)]
}

proptest! {
    #[test]
    fn every_write_is_a_status_change_and_cancelled_is_terminal(
        ops in prop::collection::vec(op_strategy(), 1..20),
    ) {
        let h = harness(InMemoryAttendeeStore::with_attendees([
            AttendeeBuilder::new("Q1", "E1").build(),
        ]));

        let mut changes = 0;
        let mut status = AttendeeStatus::Registered;
        for op in ops {
            let before = status;
            let result = tokio_test::block_on(async {
                match op {
                    Op::CheckIn => h.app.check_in.check_in(scan("Q1", Some("E1"))).await,
                    Op::CheckOut => h.app.check_in.check_out(exit("Q1")).await,
                    Op::Cancel => h.app.check_in.cancel(&q1(), None).await,
                }
            });
            if let Ok(outcome) = result {
                if outcome.attendee.status != status {
                    changes += 1;
                    status = outcome.attendee.status;
                }
            }
            let stored = h.store.snapshot(&q1()).unwrap().status;
            prop_assert_eq!(stored, status);
            if before == AttendeeStatus::Cancelled {
                prop_assert_eq!(status, AttendeeStatus::Cancelled);
            }
            h.clock.advance(Duration::minutes(1));
        }

        prop_assert_eq!(h.store.write_count(), changes);
        prop_assert_eq!(h.bus.events().len(), changes);
    }
}
