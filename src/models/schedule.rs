use super::{day::DutyDay, duty_kind::DutyKind};
use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Same-day wall-clock window, closed-open: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Back-to-back windows (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// `08:00-09:30`, the form stored on absence markers.
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// A recurring weekly duty assignment.
#[derive(Debug, Clone, Serialize)]
pub struct DutySchedule {
    pub id: i64,                   // ⇔ duty_schedules.id (0 = not stored yet)
    pub scholar_id: String,        // ⇔ duty_schedules.scholar_id
    pub day: DutyDay,              // ⇔ duty_schedules.day ('Monday' … 'Friday')
    pub start_time: NaiveTime,     // ⇔ duty_schedules.start_time (TEXT "HH:MM")
    pub end_time: NaiveTime,       // ⇔ duty_schedules.end_time (TEXT "HH:MM")
    pub location: String,          // ⇔ duty_schedules.location
    pub kind: DutyKind,            // ⇔ duty_schedules.kind
    pub active: bool,              // ⇔ duty_schedules.active (0/1)
    pub created_at: NaiveDateTime, // ⇔ duty_schedules.created_at
}

impl DutySchedule {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }
}
