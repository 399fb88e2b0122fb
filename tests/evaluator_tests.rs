use chrono::NaiveDateTime;
use dutytracker::core::evaluator::{PresenceRule, Verdict, evaluate};
use dutytracker::models::day::DutyDay;
use dutytracker::models::duty_kind::DutyKind;
use dutytracker::models::evidence::{AttendanceEvent, EvidenceSource};
use dutytracker::models::occurrence::Occurrence;
use dutytracker::models::schedule::DutySchedule;

mod common;
use common::{date, hm, ts};

fn occurrence() -> Occurrence {
    Occurrence::new(
        date("2025-07-07"),
        DutySchedule {
            id: 1,
            scholar_id: "S1".into(),
            day: DutyDay::Monday,
            start_time: hm("08:00"),
            end_time: hm("09:30"),
            location: "Room 201".into(),
            kind: DutyKind::Facilitator,
            active: true,
            created_at: ts("2025-07-01 10:00"),
        },
    )
}

fn event(id: i64, source: EvidenceSource, at: &str, completed: Option<&str>) -> AttendanceEvent {
    AttendanceEvent {
        id,
        scholar_id: "S1".into(),
        source,
        occurred_at: ts(at),
        completed_at: completed.map(ts),
        location: "Room 201".into(),
        raw_status: None,
        reference: None,
        recorded_at: ts(at),
    }
}

fn after() -> NaiveDateTime {
    ts("2025-07-08 00:05")
}

#[test]
fn pending_before_end_regardless_of_evidence() {
    let photo = event(1, EvidenceSource::SelfPhoto, "2025-07-07 08:05", None);
    assert_eq!(
        evaluate(&occurrence(), &[photo], ts("2025-07-07 09:29")),
        Verdict::Pending
    );
}

#[test]
fn judged_exactly_at_scheduled_end() {
    assert_eq!(
        evaluate(&occurrence(), &[], ts("2025-07-07 09:30")),
        Verdict::Absent
    );
}

#[test]
fn earliest_qualifying_event_is_cited() {
    let events = vec![
        event(7, EvidenceSource::SelfPhoto, "2025-07-07 09:00", None),
        event(3, EvidenceSource::QrScan, "2025-07-07 07:50", Some("2025-07-07 09:40")),
        event(9, EvidenceSource::SelfPhoto, "2025-07-07 08:10", None),
    ];
    assert_eq!(
        evaluate(&occurrence(), &events, after()),
        Verdict::Present {
            evidence_id: 3,
            rule: PresenceRule::CheckoutAfterEnd,
            verified_at: ts("2025-07-07 09:40"),
        }
    );
}

#[test]
fn checkout_equal_to_end_does_not_count() {
    let on_the_dot = event(1, EvidenceSource::QrScan, "2025-07-07 08:00", Some("2025-07-07 09:30"));
    assert_eq!(evaluate(&occurrence(), &[on_the_dot], after()), Verdict::Absent);
}

#[test]
fn other_days_and_scholars_are_ignored() {
    let mut other_day = event(1, EvidenceSource::SelfPhoto, "2025-07-08 08:05", None);
    other_day.location = "Room 201".into();
    let mut other_scholar = event(2, EvidenceSource::SelfPhoto, "2025-07-07 08:05", None);
    other_scholar.scholar_id = "S2".into();

    assert_eq!(
        evaluate(&occurrence(), &[other_day, other_scholar], after()),
        Verdict::Absent
    );
}

#[test]
fn self_photo_counts_even_without_checkout() {
    let photo = event(4, EvidenceSource::SelfPhoto, "2025-07-07 16:00", None);
    let verdict = evaluate(&occurrence(), &[photo], after());
    assert!(matches!(
        verdict,
        Verdict::Present {
            rule: PresenceRule::SelfPhoto,
            evidence_id: 4,
            ..
        }
    ));
}
