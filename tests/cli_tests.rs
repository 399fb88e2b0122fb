use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::TestEnv;

fn assign_monday(env: &TestEnv) {
    env.cmd()
        .args([
            "assign",
            "S1",
            "--day",
            "mon",
            "--start",
            "8:00 AM",
            "--end",
            "9:30 AM",
            "--location",
            "Room 201",
        ])
        .assert()
        .success()
        .stdout(contains("Duty #1 saved").and(contains("08:00-09:30")));
}

#[test]
fn init_creates_database() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));
    assert!(std::path::Path::new(&env.db).exists());
}

#[test]
fn assign_and_list_duties() {
    let env = TestEnv::new();
    env.init();
    assign_monday(&env);

    env.cmd()
        .args(["duties", "--scholar", "S1"])
        .assert()
        .success()
        .stdout(contains("Monday").and(contains("Room 201")).and(contains("Facilitator")));
}

#[test]
fn overlapping_assignment_fails() {
    let env = TestEnv::new();
    env.init();
    assign_monday(&env);

    env.cmd()
        .args([
            "assign", "S1", "--day", "mon", "--start", "09:00", "--end", "10:30", "--location",
            "Room 202",
        ])
        .assert()
        .failure()
        .stderr(contains("Schedule conflict with duty #1"));
}

#[test]
fn off_grid_time_fails() {
    let env = TestEnv::new();
    env.init();

    env.cmd()
        .args([
            "assign", "S1", "--day", "tue", "--start", "08:15", "--end", "09:15", "--location",
            "Room 201",
        ])
        .assert()
        .failure()
        .stderr(contains("half-hour grid"));
}

#[test]
fn photo_then_reconcile_marks_present() {
    let env = TestEnv::new();
    env.init();
    assign_monday(&env);

    // Duties created "today" only produce occurrences from today on, so
    // backdate the assignment for this scenario.
    let conn = rusqlite::Connection::open(&env.db).expect("open db");
    conn.execute(
        "UPDATE duty_schedules SET created_at = '2025-07-01 10:00:00'",
        [],
    )
    .expect("backdate");
    drop(conn);

    env.cmd()
        .args([
            "record",
            "--source",
            "photo",
            "--scholar",
            "S1",
            "--at",
            "2025-07-07 08:05",
            "--location",
            "Room 201",
        ])
        .assert()
        .success()
        .stdout(contains("Evidence #1 recorded"));

    env.cmd()
        .args(["reconcile", "--now", "2025-07-08 00:05"])
        .assert()
        .success()
        .stdout(contains("created 1"));

    env.cmd()
        .args(["records", "--scholar", "S1"])
        .assert()
        .success()
        .stdout(contains("Present").and(contains("#1")));

    env.cmd()
        .args(["reconcile", "--now", "2025-07-08 00:05"])
        .assert()
        .success()
        .stdout(contains("unchanged 1"));

    env.cmd()
        .args(["absences", "--scholar", "S1"])
        .assert()
        .success()
        .stdout(contains("Total: ").and(contains("0")));
}

#[test]
fn reconcile_range_reports_absences() {
    let env = TestEnv::new();
    env.init();
    assign_monday(&env);

    let conn = rusqlite::Connection::open(&env.db).expect("open db");
    conn.execute(
        "UPDATE duty_schedules SET created_at = '2025-06-30 07:00:00'",
        [],
    )
    .expect("backdate");
    drop(conn);

    env.cmd()
        .args([
            "reconcile",
            "--from",
            "2025-06-30",
            "--to",
            "2025-07-13",
            "--now",
            "2025-07-16 00:05",
        ])
        .assert()
        .success()
        .stdout(contains("created 2"));

    env.cmd()
        .args(["absences", "--scholar", "S1"])
        .assert()
        .success()
        .stdout(contains("2025-07-07").and(contains("2025-06-30")));
}

#[test]
fn duplicate_record_is_reported() {
    let env = TestEnv::new();
    env.init();

    let args = [
        "record",
        "--source",
        "qr",
        "--scholar",
        "S1",
        "--at",
        "2025-07-07 07:55",
        "--location",
        "Room 201",
    ];
    env.cmd().args(args).assert().success();
    env.cmd()
        .args(args)
        .assert()
        .success()
        .stdout(contains("Duplicate of evidence #1"));
}

#[test]
fn malformed_import_entries_are_skipped() {
    let env = TestEnv::new();
    env.init();

    let file = env.path("batch.json");
    fs::write(
        &file,
        r#"[
            {"source": "self_photo", "scholar_id": "S1", "occurred_at": "2025-07-07T08:05:00", "location": "Room 201"},
            {"source": "qr_scan", "scholar_id": "S1", "occurred_at": "2025-07-07T07:55:00"}
        ]"#,
    )
    .expect("write batch");

    env.cmd()
        .args(["import", &file.to_string_lossy()])
        .assert()
        .success()
        .stdout(contains("2 event(s) processed, 1 rejected"))
        .stderr(contains("missing location"));
}

#[test]
fn deactivate_unknown_duty_fails() {
    let env = TestEnv::new();
    env.init();
    env.cmd()
        .args(["deactivate", "42"])
        .assert()
        .failure()
        .stderr(contains("Unknown duty schedule #42"));
}

#[test]
fn log_shows_audited_operations() {
    let env = TestEnv::new();
    env.init();
    assign_monday(&env);
    env.cmd()
        .args(["deactivate", "1"])
        .assert()
        .success()
        .stdout(contains("deactivated"));

    env.cmd()
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(
            contains("migration_applied")
                .and(contains("assign"))
                .and(contains("deactivate")),
        );
}

#[test]
fn sweep_once_closes_yesterday() {
    let env = TestEnv::new();
    env.init();
    assign_monday(&env);

    let conn = rusqlite::Connection::open(&env.db).expect("open db");
    conn.execute(
        "UPDATE duty_schedules SET created_at = '2025-07-01 10:00:00'",
        [],
    )
    .expect("backdate");
    drop(conn);

    env.cmd()
        .args(["sweep", "--once", "--now", "2025-07-08 00:05"])
        .assert()
        .success()
        .stdout(contains("Sweep completed: created 1"));
}

#[test]
fn db_info_and_check() {
    let env = TestEnv::new();
    env.init();
    env.cmd()
        .args(["db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("Active duties").and(contains("Integrity check passed")));
}
