#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use dutytracker::core::assign::{AssignLogic, DutyRequest};
use dutytracker::db::initialize::init_db;
use dutytracker::db::pool::DbPool;
use dutytracker::models::day::DutyDay;
use dutytracker::models::duty_kind::DutyKind;
use dutytracker::models::evidence::{EvidenceSource, RawEvent};
use dutytracker::models::schedule::DutySchedule;
use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated home + database for one CLI test.
pub struct TestEnv {
    pub home: TempDir,
    pub db: String,
}

impl TestEnv {
    pub fn new() -> Self {
        let home = TempDir::new().expect("temp home");
        let db = home
            .path()
            .join("dutytracker_test.sqlite")
            .to_string_lossy()
            .to_string();
        Self { home, db }
    }

    /// `dutytracker --db <db> ...` with HOME pointing at the temp dir.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("dutytracker");
        cmd.env("HOME", self.home.path())
            .env_remove("RUST_LOG")
            .args(["--db", &self.db]);
        cmd
    }

    pub fn init(&self) {
        self.cmd().args(["--test", "init"]).assert().success();
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.home.path().join(name)
    }
}

pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").expect("timestamp")
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
}

pub fn hm(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").expect("time")
}

/// In-memory database with the full schema.
pub fn memory_pool() -> DbPool {
    let pool = DbPool::in_memory().expect("in-memory db");
    init_db(&pool.conn).expect("schema");
    pool
}

pub fn file_pool(path: &std::path::Path) -> DbPool {
    let pool = DbPool::open(path, 5000).expect("file db");
    init_db(&pool.conn).expect("schema");
    pool
}

pub fn request(scholar: &str, day: DutyDay, start: &str, end: &str, location: &str) -> DutyRequest {
    DutyRequest {
        scholar_id: scholar.to_string(),
        day,
        start: hm(start),
        end: hm(end),
        location: Some(location.to_string()),
        kind: DutyKind::Facilitator,
    }
}

/// Facilitator duty created at `created`.
pub fn assign(
    pool: &mut DbPool,
    scholar: &str,
    day: DutyDay,
    start: &str,
    end: &str,
    location: &str,
    created: &str,
) -> DutySchedule {
    AssignLogic::apply(
        pool,
        &request(scholar, day, start, end, location),
        None,
        2,
        ts(created),
    )
    .expect("assign duty")
}

pub fn raw(source: EvidenceSource, scholar: &str, at: &str, location: &str) -> RawEvent {
    RawEvent {
        scholar_id: Some(scholar.to_string()),
        occurred_at: Some(ts(at)),
        location: Some(location.to_string()),
        ..RawEvent::new(source)
    }
}
