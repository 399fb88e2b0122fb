use chrono::Duration;
use dutytracker::core::ingest::{Ingestor, Recorded, record_event};
use dutytracker::db::events::{get_event, list_events};
use dutytracker::errors::AppError;
use dutytracker::models::evidence::{EvidenceSource, RawEvent};

mod common;
use common::{memory_pool, raw, ts};

const WINDOW: i64 = 5;

fn now() -> chrono::NaiveDateTime {
    ts("2025-07-07 18:00")
}

#[test]
fn normalize_requires_scholar_location_and_time() {
    let mut no_location = raw(EvidenceSource::SelfPhoto, "S1", "2025-07-07 08:05", "x");
    no_location.location = Some("   ".into());
    assert!(matches!(
        Ingestor::normalize(&no_location, now()),
        Err(AppError::MalformedEvidence(_))
    ));

    let mut no_scholar = raw(EvidenceSource::QrScan, "S1", "2025-07-07 08:05", "Room 201");
    no_scholar.scholar_id = None;
    assert!(Ingestor::normalize(&no_scholar, now()).is_err());

    assert!(Ingestor::normalize(&RawEvent::new(EvidenceSource::ManualEncoding), now()).is_err());
}

#[test]
fn normalize_cleans_fields_per_source() {
    let mut photo = raw(EvidenceSource::SelfPhoto, " S1 ", "2025-07-07 08:05", " Room 201 ");
    photo.completed_at = Some(ts("2025-07-07 10:00"));
    photo.reference = Some("  ".into());
    let ev = Ingestor::normalize(&photo, now()).expect("photo");
    assert_eq!(ev.scholar_id, "S1");
    assert_eq!(ev.location, "Room 201");
    assert_eq!(ev.completed_at, None);
    assert_eq!(ev.reference, None);

    let mut manual = raw(EvidenceSource::ManualEncoding, "S1", "2025-07-07 08:00", "Room 201");
    manual.raw_status = Some("present".into());
    let ev = Ingestor::normalize(&manual, now()).expect("manual");
    assert_eq!(ev.raw_status.as_deref(), Some("Present"));
    assert!(!ev.is_explicit_absent());

    let mut backwards = raw(EvidenceSource::ManualEncoding, "S1", "2025-07-07 10:00", "Room 201");
    backwards.completed_at = Some(ts("2025-07-07 09:00"));
    assert!(matches!(
        Ingestor::normalize(&backwards, now()),
        Err(AppError::MalformedEvidence(_))
    ));

    let photo_checkout = RawEvent {
        checkout: true,
        ..raw(EvidenceSource::SelfPhoto, "S1", "2025-07-07 08:05", "Room 201")
    };
    assert!(Ingestor::normalize(&photo_checkout, now()).is_err());
}

#[test]
fn redelivery_within_window_is_not_appended() {
    let mut pool = memory_pool();
    let window = Duration::minutes(WINDOW);

    let first = record_event(
        &mut pool,
        &raw(EvidenceSource::SelfPhoto, "S1", "2025-07-07 08:05", "Room 201"),
        window,
        now(),
    )
    .expect("first");
    assert!(matches!(first, Recorded::Appended(_)));

    let again = record_event(
        &mut pool,
        &raw(EvidenceSource::SelfPhoto, "S1", "2025-07-07 08:08", "Room 201"),
        window,
        now(),
    )
    .expect("again");
    assert!(matches!(again, Recorded::Duplicate(ref e) if e.id == first.event().id));

    // Outside the window, or from another channel, it is new evidence.
    let later = record_event(
        &mut pool,
        &raw(EvidenceSource::SelfPhoto, "S1", "2025-07-07 08:20", "Room 201"),
        window,
        now(),
    )
    .expect("later");
    assert!(matches!(later, Recorded::Appended(_)));

    let qr = record_event(
        &mut pool,
        &raw(EvidenceSource::QrScan, "S1", "2025-07-07 08:06", "Room 201"),
        window,
        now(),
    )
    .expect("qr");
    assert!(matches!(qr, Recorded::Appended(_)));

    assert_eq!(list_events(&pool.conn, Some("S1"), None, None).expect("events").len(), 3);
}

#[test]
fn qr_checkout_fills_open_checkin_once() {
    let mut pool = memory_pool();
    let window = Duration::minutes(WINDOW);

    let checkin = record_event(
        &mut pool,
        &raw(EvidenceSource::QrScan, "S1", "2025-07-07 07:55", "Room 201"),
        window,
        now(),
    )
    .expect("check-in");

    let checkout = RawEvent {
        checkout: true,
        ..raw(EvidenceSource::QrScan, "S1", "2025-07-07 09:45", "Room 201")
    };

    let attached = record_event(&mut pool, &checkout, window, now()).expect("checkout");
    match &attached {
        Recorded::CheckoutAttached(ev) => {
            assert_eq!(ev.id, checkin.event().id);
            assert_eq!(ev.completed_at, Some(ts("2025-07-07 09:45")));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    // Same checkout delivered twice.
    let repeated = record_event(&mut pool, &checkout, window, now()).expect("repeat");
    assert!(matches!(repeated, Recorded::Duplicate(_)));

    assert_eq!(list_events(&pool.conn, Some("S1"), None, None).expect("events").len(), 1);
    let stored = get_event(&pool.conn, checkin.event().id)
        .expect("read")
        .expect("stored");
    assert_eq!(stored.completed_at, Some(ts("2025-07-07 09:45")));
}

#[test]
fn checkout_without_checkin_is_stored_on_its_own() {
    let mut pool = memory_pool();
    let checkout = RawEvent {
        checkout: true,
        ..raw(EvidenceSource::QrScan, "S1", "2025-07-07 09:45", "Room 201")
    };

    let outcome =
        record_event(&mut pool, &checkout, Duration::minutes(WINDOW), now()).expect("checkout");
    let ev = match outcome {
        Recorded::Appended(ev) => ev,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(ev.occurred_at, ts("2025-07-07 09:45"));
    assert_eq!(ev.completed_at, Some(ts("2025-07-07 09:45")));
}

#[test]
fn rejected_evidence_is_audited_not_stored() {
    let mut pool = memory_pool();
    let mut bad = raw(EvidenceSource::ManualEncoding, "S1", "2025-07-07 08:00", "Room 201");
    bad.location = None;

    assert!(record_event(&mut pool, &bad, Duration::minutes(WINDOW), now()).is_err());
    assert!(list_events(&pool.conn, None, None, None).expect("events").is_empty());

    let rejects: i64 = pool
        .conn
        .query_row(
            "SELECT COUNT(*) FROM log WHERE operation = 'reject'",
            [],
            |row| row.get(0),
        )
        .expect("count");
    assert_eq!(rejects, 1);
}

#[test]
fn differing_content_within_window_is_new_evidence() {
    let mut pool = memory_pool();
    let window = Duration::minutes(WINDOW);

    let mut absent = raw(EvidenceSource::ManualEncoding, "S1", "2025-07-07 09:10", "Room 201");
    absent.raw_status = Some("absent".into());
    let first = record_event(&mut pool, &absent, window, now()).expect("first");

    let mut present = raw(EvidenceSource::ManualEncoding, "S1", "2025-07-07 09:12", "Room 201");
    present.raw_status = Some("present".into());
    present.completed_at = Some(ts("2025-07-07 09:13"));
    let second = record_event(&mut pool, &present, window, now()).expect("correction");
    match &second {
        Recorded::Appended(ev) => {
            assert_ne!(ev.id, first.event().id);
            assert_eq!(ev.raw_status.as_deref(), Some("Present"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    // The same correction delivered again is still a redelivery.
    let again = record_event(&mut pool, &present, window, now()).expect("repeat");
    assert!(matches!(again, Recorded::Duplicate(ref e) if e.id == second.event().id));

    let mut referenced = raw(EvidenceSource::ManualEncoding, "S1", "2025-07-07 09:11", "Room 201");
    referenced.raw_status = Some("absent".into());
    referenced.reference = Some("form-22".into());
    assert!(matches!(
        record_event(&mut pool, &referenced, window, now()).expect("referenced"),
        Recorded::Appended(_)
    ));

    assert_eq!(list_events(&pool.conn, Some("S1"), None, None).expect("events").len(), 3);
}
