use crate::errors::{AppError, AppResult};
use crate::models::record::{
    AbsenceMarker, AttendanceStatus, ReconciledRecord, RecordKey, UpsertOutcome,
};
use crate::utils::date::format_datetime;
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str =
    "id, scholar_id, schedule_date, location, status, evidence_ref, verified_at, updated_at";

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_day(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| conversion_error(idx, AppError::InvalidDate(s.to_string())))
}

pub fn map_row(row: &Row) -> rusqlite::Result<ReconciledRecord> {
    let date_str: String = row.get("schedule_date")?;
    let status_str: String = row.get("status")?;
    let status = AttendanceStatus::from_db_str(&status_str).ok_or_else(|| {
        conversion_error(4, AppError::Other(format!("Invalid status: {}", status_str)))
    })?;

    let verified: Option<String> = row.get("verified_at")?;
    let verified_at = verified
        .as_deref()
        .map(|s| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map_err(|_| conversion_error(6, AppError::InvalidDate(s.to_string())))
        })
        .transpose()?;

    Ok(ReconciledRecord {
        id: row.get("id")?,
        key: RecordKey {
            scholar_id: row.get("scholar_id")?,
            schedule_date: parse_day(2, &date_str)?,
            location: row.get("location")?,
        },
        status,
        evidence_ref: row.get("evidence_ref")?,
        verified_at,
        updated_at: row.get("updated_at")?,
    })
}

pub fn get_record(conn: &Connection, key: &RecordKey) -> rusqlite::Result<Option<ReconciledRecord>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM reconciled_records
         WHERE scholar_id = ?1 AND schedule_date = ?2 AND location = ?3"
    );
    conn.query_row(
        &sql,
        params![
            key.scholar_id,
            key.schedule_date.format("%Y-%m-%d").to_string(),
            key.location
        ],
        map_row,
    )
    .optional()
}

/// Single-statement guarded upsert: the `WHERE status = 'Pending'` clause on
/// the conflict branch is what keeps terminal rows immutable, even when two
/// connections race on the same key.
pub fn upsert_if_not_terminal(
    conn: &Connection,
    key: &RecordKey,
    status: AttendanceStatus,
    evidence_ref: Option<i64>,
    verified_at: Option<NaiveDateTime>,
) -> rusqlite::Result<UpsertOutcome> {
    let changed = conn.execute(
        "INSERT INTO reconciled_records
            (scholar_id, schedule_date, location, status, evidence_ref, verified_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(scholar_id, schedule_date, location) DO UPDATE SET
            status       = excluded.status,
            evidence_ref = excluded.evidence_ref,
            verified_at  = excluded.verified_at,
            updated_at   = excluded.updated_at
         WHERE reconciled_records.status = 'Pending'",
        params![
            key.scholar_id,
            key.schedule_date.format("%Y-%m-%d").to_string(),
            key.location,
            status.to_db_str(),
            evidence_ref,
            verified_at.as_ref().map(format_datetime),
            Local::now().to_rfc3339(),
        ],
    )?;

    Ok(if changed > 0 {
        UpsertOutcome::Written
    } else {
        UpsertOutcome::Skipped
    })
}

pub fn upsert_absence_marker(
    conn: &Connection,
    marker: &AbsenceMarker,
) -> rusqlite::Result<UpsertOutcome> {
    let changed = conn.execute(
        "INSERT INTO absence_markers (scholar_id, date, location, time_window, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(scholar_id, date, location, time_window) DO NOTHING",
        params![
            marker.scholar_id,
            marker.date.format("%Y-%m-%d").to_string(),
            marker.location,
            marker.time_window,
            Local::now().to_rfc3339(),
        ],
    )?;

    Ok(if changed > 0 {
        UpsertOutcome::Written
    } else {
        UpsertOutcome::Skipped
    })
}

pub fn list_records(
    conn: &Connection,
    scholar_id: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> AppResult<Vec<ReconciledRecord>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM reconciled_records
         WHERE (?1 IS NULL OR scholar_id = ?1)
           AND (?2 IS NULL OR schedule_date >= ?2)
           AND (?3 IS NULL OR schedule_date <= ?3)
         ORDER BY schedule_date ASC, scholar_id ASC, location ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            scholar_id,
            from.map(|d| d.format("%Y-%m-%d").to_string()),
            to.map(|d| d.format("%Y-%m-%d").to_string()),
        ],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Newest first, as the absence list is shown to scholars.
pub fn list_absences(conn: &Connection, scholar_id: &str) -> AppResult<Vec<AbsenceMarker>> {
    let mut stmt = conn.prepare(
        "SELECT scholar_id, date, location, time_window FROM absence_markers
         WHERE scholar_id = ?1
         ORDER BY date DESC, time_window DESC",
    )?;
    let rows = stmt.query_map([scholar_id], |row| {
        let date_str: String = row.get(1)?;
        Ok(AbsenceMarker {
            scholar_id: row.get(0)?,
            date: parse_day(1, &date_str)?,
            location: row.get(2)?,
            time_window: row.get(3)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_absences(conn: &Connection, scholar_id: &str) -> AppResult<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM absence_markers WHERE scholar_id = ?1",
        [scholar_id],
        |row| row.get(0),
    )?;
    Ok(n)
}
