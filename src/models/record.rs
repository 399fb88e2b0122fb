use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttendanceStatus {
    Pending,
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Present and Absent are never rewritten by reconciliation.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttendanceStatus::Pending)
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Pending => "Pending",
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(AttendanceStatus::Pending),
            "Present" => Some(AttendanceStatus::Present),
            "Absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// Natural key of a reconciled record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecordKey {
    pub scholar_id: String,
    pub schedule_date: NaiveDate,
    pub location: String,
}

impl RecordKey {
    pub fn new(scholar_id: &str, schedule_date: NaiveDate, location: &str) -> Self {
        Self {
            scholar_id: scholar_id.to_string(),
            schedule_date,
            location: location.to_string(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} @ {}",
            self.scholar_id, self.schedule_date, self.location
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRecord {
    pub id: i64,
    pub key: RecordKey,
    pub status: AttendanceStatus,
    pub evidence_ref: Option<i64>, // ⇔ attendance_events.id that justified Present
    pub verified_at: Option<NaiveDateTime>,
    pub updated_at: String,
}

/// Result of a guarded upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Written,
    Skipped,
}

/// Penalty row kept for downstream reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsenceMarker {
    pub scholar_id: String,
    pub date: NaiveDate,
    pub location: String,
    pub time_window: String,
}
