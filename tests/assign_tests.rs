use dutytracker::core::assign::{AssignLogic, DutyRequest, UNASSIGNED_LOCATION};
use dutytracker::core::overlap::{check_overlap, validate_window};
use dutytracker::core::slots;
use dutytracker::db::schedules::list_schedules;
use dutytracker::errors::AppError;
use dutytracker::models::day::DutyDay;
use dutytracker::models::duty_kind::DutyKind;

mod common;
use common::{hm, memory_pool, request, ts};

#[test]
fn grid_has_twenty_one_half_hour_boundaries() {
    let grid = slots::boundaries();
    assert_eq!(grid.len(), 21);
    assert_eq!(grid.first(), Some(&hm("07:00")));
    assert_eq!(grid.last(), Some(&hm("17:00")));
    assert_eq!(slots::index_of(hm("08:30")), Some(3));
    assert_eq!(slots::index_of(hm("08:15")), None);
}

#[test]
fn windows_must_be_on_grid_ordered_and_at_least_an_hour() {
    assert!(validate_window(hm("08:00"), hm("09:00")).is_ok());
    assert!(matches!(
        validate_window(hm("08:15"), hm("09:15")),
        Err(AppError::InvalidWindow(_))
    ));
    assert!(matches!(
        validate_window(hm("09:00"), hm("08:00")),
        Err(AppError::InvalidWindow(_))
    ));
    assert!(matches!(
        validate_window(hm("09:00"), hm("09:30")),
        Err(AppError::InvalidWindow(_))
    ));
    assert!(matches!(
        validate_window(hm("16:30"), hm("17:30")),
        Err(AppError::InvalidWindow(_))
    ));
}

#[test]
fn overlapping_tuesday_window_is_rejected() {
    let mut pool = memory_pool();
    let now = ts("2025-07-01 10:00");

    let first = AssignLogic::apply(
        &mut pool,
        &request("S1", DutyDay::Tuesday, "09:00", "10:00", "Room 201"),
        None,
        3,
        now,
    )
    .expect("first duty");

    let err = AssignLogic::apply(
        &mut pool,
        &request("S1", DutyDay::Tuesday, "09:30", "11:00", "Room 202"),
        None,
        3,
        now,
    )
    .expect_err("overlap must be rejected");
    match err {
        AppError::ScheduleConflict { existing_id, .. } => assert_eq!(existing_id, first.id),
        other => panic!("unexpected error: {other}"),
    }

    // Touching windows do not overlap.
    AssignLogic::apply(
        &mut pool,
        &request("S1", DutyDay::Tuesday, "10:00", "11:00", "Room 202"),
        None,
        3,
        now,
    )
    .expect("adjacent duty");

    let existing = list_schedules(&pool.conn, Some("S1"), None, true).expect("list");
    assert!(check_overlap(&existing, "S1", DutyDay::Tuesday, hm("10:30"), hm("11:30"), None)
        .expect("check"));
    assert!(!check_overlap(&existing, "S1", DutyDay::Wednesday, hm("09:00"), hm("10:00"), None)
        .expect("check"));
    assert!(!check_overlap(&existing, "S2", DutyDay::Tuesday, hm("09:00"), hm("10:00"), None)
        .expect("check"));
}

#[test]
fn editing_a_duty_ignores_its_own_window() {
    let mut pool = memory_pool();
    let now = ts("2025-07-01 10:00");
    let duty = AssignLogic::apply(
        &mut pool,
        &request("S1", DutyDay::Monday, "08:00", "09:30", "Room 201"),
        None,
        2,
        now,
    )
    .expect("duty");

    let edited = AssignLogic::apply(
        &mut pool,
        &request("S1", DutyDay::Monday, "08:30", "10:00", "Room 201"),
        Some(duty.id),
        2,
        ts("2025-07-05 10:00"),
    )
    .expect("edit");
    assert_eq!(edited.id, duty.id);
    assert_eq!(edited.start_time, hm("08:30"));
    // Creation date is kept so backfills still start at the original assignment.
    assert_eq!(edited.created_at, now);

    assert!(matches!(
        AssignLogic::apply(
            &mut pool,
            &request("S1", DutyDay::Monday, "08:30", "10:00", "Room 201"),
            Some(999),
            2,
            now,
        ),
        Err(AppError::UnknownSchedule(999))
    ));
}

#[test]
fn at_most_two_active_duties_per_scholar() {
    let mut pool = memory_pool();
    let now = ts("2025-07-01 10:00");
    for day in [DutyDay::Monday, DutyDay::Wednesday] {
        AssignLogic::apply(
            &mut pool,
            &request("S1", day, "08:00", "09:00", "Room 201"),
            None,
            2,
            now,
        )
        .expect("duty");
    }

    let err = AssignLogic::apply(
        &mut pool,
        &request("S1", DutyDay::Friday, "08:00", "09:00", "Room 201"),
        None,
        2,
        now,
    )
    .expect_err("limit");
    assert!(matches!(err, AppError::ScheduleLimit { limit: 2, .. }));

    // Deactivating one frees a slot.
    let first = list_schedules(&pool.conn, Some("S1"), None, true).expect("list")[0].clone();
    AssignLogic::deactivate(&mut pool, first.id).expect("deactivate");
    AssignLogic::apply(
        &mut pool,
        &request("S1", DutyDay::Friday, "08:00", "09:00", "Room 201"),
        None,
        2,
        now,
    )
    .expect("slot freed");

    assert_eq!(list_schedules(&pool.conn, Some("S1"), None, false).expect("all").len(), 3);
}

#[test]
fn checker_without_room_is_unassigned_and_facilitator_needs_one() {
    let mut pool = memory_pool();
    let now = ts("2025-07-01 10:00");

    let checker = AssignLogic::apply(
        &mut pool,
        &DutyRequest {
            scholar_id: "C1".into(),
            day: DutyDay::Thursday,
            start: hm("13:00"),
            end: hm("15:00"),
            location: None,
            kind: DutyKind::Checker,
        },
        None,
        2,
        now,
    )
    .expect("checker");
    assert_eq!(checker.location, UNASSIGNED_LOCATION);

    let err = AssignLogic::apply(
        &mut pool,
        &DutyRequest {
            scholar_id: "F1".into(),
            day: DutyDay::Thursday,
            start: hm("13:00"),
            end: hm("15:00"),
            location: Some("  ".into()),
            kind: DutyKind::Facilitator,
        },
        None,
        2,
        now,
    );
    assert!(err.is_err());
}
