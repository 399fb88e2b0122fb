pub mod absences;
pub mod assign;
pub mod config;
pub mod db;
pub mod deactivate;
pub mod duties;
pub mod import;
pub mod init;
pub mod log;
pub mod reconcile;
pub mod record;
pub mod records;
pub mod sweep;

use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::utils::clock::{Clock, FixedClock, SystemClock};
use crate::utils::date;
use chrono::NaiveDate;
use std::sync::Arc;

/// Open the configured database and bring its schema up to date.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::open(&cfg.database_path(), cfg.busy_timeout_ms)?;
    init_db(&pool.conn)?;
    Ok(pool)
}

/// `--now` freezes the clock; otherwise the local wall clock is used.
pub(crate) fn clock_from(now: &Option<String>) -> AppResult<Arc<dyn Clock>> {
    match now {
        Some(s) => {
            let at = date::parse_datetime(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?;
            Ok(Arc::new(FixedClock(at)))
        }
        None => Ok(Arc::new(SystemClock)),
    }
}

pub(crate) fn parse_optional_date(value: &Option<String>) -> AppResult<Option<NaiveDate>> {
    value
        .as_deref()
        .map(|s| date::parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string())))
        .transpose()
}
