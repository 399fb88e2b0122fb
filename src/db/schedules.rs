use crate::errors::{AppError, AppResult};
use crate::models::day::DutyDay;
use crate::models::duty_kind::DutyKind;
use crate::models::schedule::DutySchedule;
use crate::utils::date::format_datetime;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str =
    "id, scholar_id, day, start_time, end_time, location, kind, active, created_at";

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub fn map_row(row: &Row) -> rusqlite::Result<DutySchedule> {
    let day_str: String = row.get("day")?;
    let day = DutyDay::from_db_str(&day_str)
        .ok_or_else(|| conversion_error(2, AppError::InvalidDay(day_str.clone())))?;

    let start_str: String = row.get("start_time")?;
    let start_time = NaiveTime::parse_from_str(&start_str, "%H:%M")
        .map_err(|_| conversion_error(3, AppError::InvalidTime(start_str.clone())))?;

    let end_str: String = row.get("end_time")?;
    let end_time = NaiveTime::parse_from_str(&end_str, "%H:%M")
        .map_err(|_| conversion_error(4, AppError::InvalidTime(end_str.clone())))?;

    let kind_str: String = row.get("kind")?;
    let kind = DutyKind::from_db_str(&kind_str)
        .ok_or_else(|| conversion_error(6, AppError::InvalidDutyKind(kind_str.clone())))?;

    let created_str: String = row.get("created_at")?;
    let created_at = NaiveDateTime::parse_from_str(&created_str, "%Y-%m-%d %H:%M:%S")
        .map_err(|_| conversion_error(8, AppError::InvalidDate(created_str.clone())))?;

    Ok(DutySchedule {
        id: row.get("id")?,
        scholar_id: row.get("scholar_id")?,
        day,
        start_time,
        end_time,
        location: row.get("location")?,
        kind,
        active: row.get::<_, i32>("active")? == 1,
        created_at,
    })
}

pub fn insert_schedule(conn: &Connection, s: &DutySchedule) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO duty_schedules (scholar_id, day, start_time, end_time, location, kind, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            s.scholar_id,
            s.day.to_db_str(),
            s.start_time.format("%H:%M").to_string(),
            s.end_time.format("%H:%M").to_string(),
            s.location,
            s.kind.to_db_str(),
            if s.active { 1 } else { 0 },
            format_datetime(&s.created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update everything except `id` and `created_at`.
pub fn update_schedule(conn: &Connection, s: &DutySchedule) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE duty_schedules
         SET scholar_id = ?1, day = ?2, start_time = ?3, end_time = ?4,
             location = ?5, kind = ?6, active = ?7
         WHERE id = ?8",
        params![
            s.scholar_id,
            s.day.to_db_str(),
            s.start_time.format("%H:%M").to_string(),
            s.end_time.format("%H:%M").to_string(),
            s.location,
            s.kind.to_db_str(),
            if s.active { 1 } else { 0 },
            s.id,
        ],
    )?;
    if changed == 0 {
        return Err(AppError::UnknownSchedule(s.id));
    }
    Ok(())
}

pub fn get_schedule(conn: &Connection, id: i64) -> AppResult<Option<DutySchedule>> {
    let sql = format!("SELECT {COLUMNS} FROM duty_schedules WHERE id = ?1");
    let found = conn.query_row(&sql, [id], map_row).optional()?;
    Ok(found)
}

pub fn deactivate_schedule(conn: &Connection, id: i64) -> AppResult<()> {
    let changed = conn.execute("UPDATE duty_schedules SET active = 0 WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::UnknownSchedule(id));
    }
    Ok(())
}

/// Schedules filtered by scholar, day and activity; ordered for display.
pub fn list_schedules(
    conn: &Connection,
    scholar_id: Option<&str>,
    day: Option<DutyDay>,
    active_only: bool,
) -> rusqlite::Result<Vec<DutySchedule>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM duty_schedules
         WHERE (?1 IS NULL OR scholar_id = ?1)
           AND (?2 IS NULL OR day = ?2)
           AND (?3 = 0 OR active = 1)
         ORDER BY scholar_id ASC,
                  CASE day WHEN 'Monday' THEN 1 WHEN 'Tuesday' THEN 2 WHEN 'Wednesday' THEN 3
                           WHEN 'Thursday' THEN 4 ELSE 5 END,
                  start_time ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![scholar_id, day.map(|d| d.to_db_str()), active_only as i32],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn earliest_created(
    conn: &Connection,
    scholar_id: Option<&str>,
) -> rusqlite::Result<Option<NaiveDate>> {
    let first: Option<String> = conn.query_row(
        "SELECT MIN(created_at) FROM duty_schedules WHERE (?1 IS NULL OR scholar_id = ?1)",
        [scholar_id],
        |row| row.get(0),
    )?;

    Ok(first.and_then(|s| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())))
}
