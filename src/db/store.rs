//! `DbPool` as the engine's storage backend.

use crate::core::store::{EvidenceLog, ReconciledStore, ScheduleSource};
use crate::db::pool::DbPool;
use crate::db::{events, records, schedules};
use crate::errors::{AppError, AppResult};
use crate::models::day::DutyDay;
use crate::models::evidence::AttendanceEvent;
use crate::models::record::{
    AbsenceMarker, AttendanceStatus, ReconciledRecord, RecordKey, UpsertOutcome,
};
use crate::models::schedule::DutySchedule;
use chrono::{NaiveDate, NaiveDateTime};

impl ScheduleSource for DbPool {
    fn list_active_schedules(
        &self,
        scholar_id: Option<&str>,
        day: Option<DutyDay>,
    ) -> AppResult<Vec<DutySchedule>> {
        schedules::list_schedules(&self.conn, scholar_id, day, true).map_err(AppError::from_storage)
    }

    fn earliest_schedule_date(&self, scholar_id: Option<&str>) -> AppResult<Option<NaiveDate>> {
        schedules::earliest_created(&self.conn, scholar_id).map_err(AppError::from_storage)
    }
}

impl EvidenceLog for DbPool {
    fn query_events(
        &self,
        scholar_id: &str,
        date: NaiveDate,
        location: &str,
    ) -> AppResult<Vec<AttendanceEvent>> {
        events::events_on(&self.conn, scholar_id, date, location).map_err(AppError::from_storage)
    }
}

impl ReconciledStore for DbPool {
    fn get_record(&self, key: &RecordKey) -> AppResult<Option<ReconciledRecord>> {
        records::get_record(&self.conn, key).map_err(AppError::from_storage)
    }

    fn upsert_if_not_terminal(
        &self,
        key: &RecordKey,
        status: AttendanceStatus,
        evidence_ref: Option<i64>,
        verified_at: Option<NaiveDateTime>,
    ) -> AppResult<UpsertOutcome> {
        records::upsert_if_not_terminal(&self.conn, key, status, evidence_ref, verified_at)
            .map_err(AppError::from_storage)
    }

    fn upsert_absence_marker(&self, marker: &AbsenceMarker) -> AppResult<UpsertOutcome> {
        records::upsert_absence_marker(&self.conn, marker).map_err(AppError::from_storage)
    }
}
