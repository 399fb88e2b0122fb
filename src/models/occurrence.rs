use super::{record::RecordKey, schedule::DutySchedule};
use chrono::{NaiveDate, NaiveDateTime};

/// One concrete calendar-date instance of a recurring duty.
/// Derived on the fly, never stored.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub schedule: DutySchedule,
}

impl Occurrence {
    pub fn new(date: NaiveDate, schedule: DutySchedule) -> Self {
        Self { date, schedule }
    }

    pub fn scholar_id(&self) -> &str {
        &self.schedule.scholar_id
    }

    pub fn location(&self) -> &str {
        &self.schedule.location
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.schedule.start_time)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.date.and_time(self.schedule.end_time)
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.scholar_id(), self.date, self.location())
    }
}
