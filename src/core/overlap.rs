//! Schedule overlap validation.
//!
//! Windows are compared by their grid indices as closed-open intervals on
//! the same day, so a duty ending at 10:00 and one starting at 10:00 can
//! coexist.

use crate::core::slots::{self, MIN_DUTY_STEPS};
use crate::errors::{AppError, AppResult};
use crate::models::day::DutyDay;
use crate::models::schedule::{DutySchedule, TimeWindow};
use chrono::NaiveTime;

/// Grid indices of a validated window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpan {
    pub start: usize,
    pub end: usize,
}

impl SlotSpan {
    pub fn overlaps(&self, other: &SlotSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Map a window onto the grid, rejecting off-grid, inverted and too-short windows.
pub fn validate_window(start: NaiveTime, end: NaiveTime) -> AppResult<SlotSpan> {
    let window = TimeWindow::new(start, end).label();

    let s = slots::index_of(start).ok_or_else(|| {
        AppError::InvalidWindow(format!("{}: start is not on the half-hour grid", window))
    })?;
    let e = slots::index_of(end).ok_or_else(|| {
        AppError::InvalidWindow(format!("{}: end is not on the half-hour grid", window))
    })?;

    if s >= e {
        return Err(AppError::InvalidWindow(format!(
            "{}: end must be later than start",
            window
        )));
    }
    if e - s < MIN_DUTY_STEPS {
        return Err(AppError::InvalidWindow(format!(
            "{}: duties must last at least one hour",
            window
        )));
    }

    Ok(SlotSpan { start: s, end: e })
}

/// Find the first active schedule of `scholar_id` on `day` that collides with
/// `[start, end)`, ignoring `excluding` (the schedule being edited).
///
/// Existing rows that are themselves off-grid are compared by wall-clock
/// time so a legacy row can still block a new one.
pub fn find_conflict<'a>(
    existing: &'a [DutySchedule],
    scholar_id: &str,
    day: DutyDay,
    start: NaiveTime,
    end: NaiveTime,
    excluding: Option<i64>,
) -> AppResult<Option<&'a DutySchedule>> {
    let candidate = validate_window(start, end)?;
    let candidate_window = TimeWindow::new(start, end);

    let hit = existing.iter().find(|s| {
        if !s.active || s.scholar_id != scholar_id || s.day != day {
            return false;
        }
        if excluding == Some(s.id) {
            return false;
        }
        match (slots::index_of(s.start_time), slots::index_of(s.end_time)) {
            (Some(a), Some(b)) => candidate.overlaps(&SlotSpan { start: a, end: b }),
            _ => candidate_window.overlaps(&s.window()),
        }
    });

    Ok(hit)
}

/// `CheckOverlap`: true when the window conflicts with an existing active duty.
pub fn check_overlap(
    existing: &[DutySchedule],
    scholar_id: &str,
    day: DutyDay,
    start: NaiveTime,
    end: NaiveTime,
    excluding: Option<i64>,
) -> AppResult<bool> {
    Ok(find_conflict(existing, scholar_id, day, start, end, excluding)?.is_some())
}

/// Same as `find_conflict` but turns a hit into `ScheduleConflict`.
pub fn ensure_no_conflict(
    existing: &[DutySchedule],
    scholar_id: &str,
    day: DutyDay,
    start: NaiveTime,
    end: NaiveTime,
    excluding: Option<i64>,
) -> AppResult<()> {
    match find_conflict(existing, scholar_id, day, start, end, excluding)? {
        Some(s) => Err(AppError::ScheduleConflict {
            existing_id: s.id,
            day: s.day.to_db_str().to_string(),
            window: s.window().label(),
        }),
        None => Ok(()),
    }
}
