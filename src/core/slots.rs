//! The fixed half-hour grid duty windows are drawn from: 07:00 … 17:00.

use chrono::{NaiveTime, Timelike};

pub const GRID_FIRST_HOUR: u32 = 7;
pub const GRID_LAST_HOUR: u32 = 17;
pub const GRID_STEP_MINUTES: u32 = 30;

/// A duty must span at least this many grid steps (one hour).
pub const MIN_DUTY_STEPS: usize = 2;

/// Number of boundaries on the grid (21).
pub const fn boundary_count() -> usize {
    ((GRID_LAST_HOUR - GRID_FIRST_HOUR) * 60 / GRID_STEP_MINUTES + 1) as usize
}

/// All permitted boundaries, in order.
pub fn boundaries() -> Vec<NaiveTime> {
    (0..boundary_count())
        .filter_map(|i| {
            let minutes = GRID_FIRST_HOUR * 60 + i as u32 * GRID_STEP_MINUTES;
            NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        })
        .collect()
}

/// Position of `t` on the grid, or None when it is not a boundary.
pub fn index_of(t: NaiveTime) -> Option<usize> {
    if t.second() != 0 || t.nanosecond() != 0 {
        return None;
    }
    let minutes = t.hour() * 60 + t.minute();
    let first = GRID_FIRST_HOUR * 60;
    if minutes < first || minutes > GRID_LAST_HOUR * 60 {
        return None;
    }
    let offset = minutes - first;
    if offset % GRID_STEP_MINUTES != 0 {
        return None;
    }
    Some((offset / GRID_STEP_MINUTES) as usize)
}
