use crate::errors::{AppError, AppResult};
use crate::models::evidence::{AttendanceEvent, EvidenceSource};
use crate::utils::date::format_datetime;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, scholar_id, source, occurred_at, completed_at, location, raw_status, reference, recorded_at";

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_ts(idx: usize, s: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(AppError::InvalidDate(s.to_string())),
        )
    })
}

pub fn map_row(row: &Row) -> rusqlite::Result<AttendanceEvent> {
    let source_str: String = row.get("source")?;
    let source = EvidenceSource::from_db_str(&source_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            Box::new(AppError::InvalidSource(source_str.clone())),
        )
    })?;

    let occurred: String = row.get("occurred_at")?;
    let completed: Option<String> = row.get("completed_at")?;
    let recorded: String = row.get("recorded_at")?;

    Ok(AttendanceEvent {
        id: row.get("id")?,
        scholar_id: row.get("scholar_id")?,
        source,
        occurred_at: parse_ts(3, &occurred)?,
        completed_at: completed.as_deref().map(|s| parse_ts(4, s)).transpose()?,
        location: row.get("location")?,
        raw_status: row.get("raw_status")?,
        reference: row.get("reference")?,
        recorded_at: parse_ts(8, &recorded)?,
    })
}

fn collect(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<AttendanceEvent>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Append-only: evidence rows are never updated except for the one-time
/// `completed_at` fill below.
pub fn insert_event(conn: &Connection, ev: &AttendanceEvent) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO attendance_events
            (scholar_id, source, occurred_at, completed_at, location, raw_status, reference, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            ev.scholar_id,
            ev.source.to_db_str(),
            format_datetime(&ev.occurred_at),
            ev.completed_at.as_ref().map(format_datetime),
            ev.location,
            ev.raw_status,
            ev.reference,
            format_datetime(&ev.recorded_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_event(conn: &Connection, id: i64) -> AppResult<Option<AttendanceEvent>> {
    let sql = format!("SELECT {COLUMNS} FROM attendance_events WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_row).optional()?)
}

/// Events whose `occurred_at` falls on `date` for one scholar at one location.
pub fn events_on(
    conn: &Connection,
    scholar_id: &str,
    date: NaiveDate,
    location: &str,
) -> rusqlite::Result<Vec<AttendanceEvent>> {
    let day_start = date.and_time(NaiveTime::MIN);
    let next_day = day_start + Duration::days(1);
    let sql = format!(
        "SELECT {COLUMNS} FROM attendance_events
         WHERE scholar_id = ?1 AND location = ?2
           AND occurred_at >= ?3 AND occurred_at < ?4
         ORDER BY occurred_at ASC, id ASC"
    );
    collect(
        conn,
        &sql,
        params![
            scholar_id,
            location,
            format_datetime(&day_start),
            format_datetime(&next_day)
        ],
    )
}

/// An already-stored copy of `event`: same channel and content, captured
/// within `window` of it. A differing status, completion or reference makes
/// it new evidence, e.g. a checker correcting an entry.
pub fn find_near_duplicate(
    conn: &Connection,
    event: &AttendanceEvent,
    window: Duration,
) -> rusqlite::Result<Option<AttendanceEvent>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM attendance_events
         WHERE scholar_id = ?1 AND source = ?2 AND location = ?3
           AND occurred_at >= ?4 AND occurred_at <= ?5
           AND raw_status IS ?6 AND completed_at IS ?7 AND reference IS ?8
         ORDER BY occurred_at ASC LIMIT 1"
    );
    conn.query_row(
        &sql,
        params![
            event.scholar_id,
            event.source.to_db_str(),
            event.location,
            format_datetime(&(event.occurred_at - window)),
            format_datetime(&(event.occurred_at + window)),
            event.raw_status,
            event.completed_at.as_ref().map(format_datetime),
            event.reference,
        ],
        map_row,
    )
    .optional()
}

/// Latest QR check-in on the same day, before `at`, still waiting for a checkout.
pub fn find_open_qr_checkin(
    conn: &Connection,
    scholar_id: &str,
    location: &str,
    at: NaiveDateTime,
) -> rusqlite::Result<Option<AttendanceEvent>> {
    let day_start = at.date().and_time(NaiveTime::MIN);
    let sql = format!(
        "SELECT {COLUMNS} FROM attendance_events
         WHERE scholar_id = ?1 AND location = ?2 AND source = 'qr_scan'
           AND completed_at IS NULL
           AND occurred_at >= ?3 AND occurred_at <= ?4
         ORDER BY occurred_at DESC LIMIT 1"
    );
    conn.query_row(
        &sql,
        params![
            scholar_id,
            location,
            format_datetime(&day_start),
            format_datetime(&at)
        ],
        map_row,
    )
    .optional()
}

/// Fill `completed_at` once. Returns false when it was already set.
pub fn complete_event(conn: &Connection, id: i64, completed_at: NaiveDateTime) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE attendance_events SET completed_at = ?1
         WHERE id = ?2 AND completed_at IS NULL",
        params![format_datetime(&completed_at), id],
    )?;
    Ok(changed == 1)
}

pub fn list_events(
    conn: &Connection,
    scholar_id: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> rusqlite::Result<Vec<AttendanceEvent>> {
    let from_ts = from.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|t| format_datetime(&t));
    let to_ts = to
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| format_datetime(&(t + Duration::days(1))));
    let sql = format!(
        "SELECT {COLUMNS} FROM attendance_events
         WHERE (?1 IS NULL OR scholar_id = ?1)
           AND (?2 IS NULL OR occurred_at >= ?2)
           AND (?3 IS NULL OR occurred_at < ?3)
         ORDER BY occurred_at ASC, id ASC"
    );
    collect(conn, &sql, params![scholar_id, from_ts, to_ts])
}

/// A QR event already closed at exactly `completed_at` (a redelivered checkout).
pub fn find_by_completion(
    conn: &Connection,
    scholar_id: &str,
    location: &str,
    completed_at: NaiveDateTime,
) -> rusqlite::Result<Option<AttendanceEvent>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM attendance_events
         WHERE scholar_id = ?1 AND location = ?2 AND source = 'qr_scan'
           AND completed_at = ?3
         LIMIT 1"
    );
    conn.query_row(
        &sql,
        params![scholar_id, location, format_datetime(&completed_at)],
        map_row,
    )
    .optional()
}
