use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

/// Working days on which a duty can be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DutyDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl DutyDay {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DutyDay::Monday => "Monday",
            DutyDay::Tuesday => "Tuesday",
            DutyDay::Wednesday => "Wednesday",
            DutyDay::Thursday => "Thursday",
            DutyDay::Friday => "Friday",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Monday" => Some(DutyDay::Monday),
            "Tuesday" => Some(DutyDay::Tuesday),
            "Wednesday" => Some(DutyDay::Wednesday),
            "Thursday" => Some(DutyDay::Thursday),
            "Friday" => Some(DutyDay::Friday),
            _ => None,
        }
    }

    /// Helper: accept CLI input such as `mon`, `Tue`, `wednesday`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "mon" | "monday" => Some(DutyDay::Monday),
            "tue" | "tues" | "tuesday" => Some(DutyDay::Tuesday),
            "wed" | "wednesday" => Some(DutyDay::Wednesday),
            "thu" | "thurs" | "thursday" => Some(DutyDay::Thursday),
            "fri" | "friday" => Some(DutyDay::Friday),
            _ => None,
        }
    }

    pub fn from_weekday(wd: Weekday) -> Option<Self> {
        match wd {
            Weekday::Mon => Some(DutyDay::Monday),
            Weekday::Tue => Some(DutyDay::Tuesday),
            Weekday::Wed => Some(DutyDay::Wednesday),
            Weekday::Thu => Some(DutyDay::Thursday),
            Weekday::Fri => Some(DutyDay::Friday),
            Weekday::Sat | Weekday::Sun => None,
        }
    }

    /// Duty day of a calendar date; weekends carry no duties.
    pub fn of_date(date: NaiveDate) -> Option<Self> {
        Self::from_weekday(date.weekday())
    }
}
