//! Time utilities: parsing wall-clock times in 24h or AM/PM form.

use crate::errors::{AppError, AppResult};
use chrono::NaiveTime;

/// `08:30`, `8:30 AM`, `1:00PM` are all accepted.
pub fn parse_time(t: &str) -> Option<NaiveTime> {
    let t = t.trim();
    if let Ok(v) = NaiveTime::parse_from_str(t, "%H:%M") {
        return Some(v);
    }
    let compact = t.to_uppercase().replace(' ', "");
    NaiveTime::parse_from_str(&compact, "%I:%M%p").ok()
}

pub fn parse_required_time(t: &str) -> AppResult<NaiveTime> {
    parse_time(t).ok_or_else(|| AppError::InvalidTime(t.to_string()))
}
