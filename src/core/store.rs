//! Storage contracts consumed by the reconciliation engine.
//!
//! The engine only needs read access to schedules and evidence plus two
//! guarded upserts on the reconciled state. `DbPool` implements all three
//! traits on SQLite; tests can wrap it to inject failures.

use crate::errors::AppResult;
use crate::models::day::DutyDay;
use crate::models::evidence::AttendanceEvent;
use crate::models::record::{
    AbsenceMarker, AttendanceStatus, ReconciledRecord, RecordKey, UpsertOutcome,
};
use crate::models::schedule::DutySchedule;
use chrono::{NaiveDate, NaiveDateTime};

pub trait ScheduleSource {
    /// Active schedules, optionally narrowed to one scholar and/or one day.
    /// Ordered by scholar then start time.
    fn list_active_schedules(
        &self,
        scholar_id: Option<&str>,
        day: Option<DutyDay>,
    ) -> AppResult<Vec<DutySchedule>>;

    /// Creation date of the oldest schedule in scope, active or not.
    fn earliest_schedule_date(&self, scholar_id: Option<&str>) -> AppResult<Option<NaiveDate>>;
}

pub trait EvidenceLog {
    /// Events for one scholar at one location whose `occurred_at` falls on `date`.
    fn query_events(
        &self,
        scholar_id: &str,
        date: NaiveDate,
        location: &str,
    ) -> AppResult<Vec<AttendanceEvent>>;
}

pub trait ReconciledStore {
    fn get_record(&self, key: &RecordKey) -> AppResult<Option<ReconciledRecord>>;

    /// Insert when absent, overwrite when Pending, no-op when terminal.
    /// Must be atomic in the store itself.
    fn upsert_if_not_terminal(
        &self,
        key: &RecordKey,
        status: AttendanceStatus,
        evidence_ref: Option<i64>,
        verified_at: Option<NaiveDateTime>,
    ) -> AppResult<UpsertOutcome>;

    /// Unique-constrained; a second call for the same key is `Skipped`.
    fn upsert_absence_marker(&self, marker: &AbsenceMarker) -> AppResult<UpsertOutcome>;
}

/// Everything `reconcile` needs.
pub trait AttendanceStore: ScheduleSource + EvidenceLog + ReconciledStore {}

impl<T: ScheduleSource + EvidenceLog + ReconciledStore + ?Sized> AttendanceStore for T {}
