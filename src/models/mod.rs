pub mod day;
pub mod duty_kind;
pub mod evidence;
pub mod occurrence;
pub mod record;
pub mod schedule;
