//! SQLite connection wrapper (one connection per caller).

use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> AppResult<Self> {
        Self::open(Path::new(path), DEFAULT_BUSY_TIMEOUT_MS)
    }

    /// Open with a bounded busy timeout so concurrent writers wait briefly
    /// instead of failing or blocking forever.
    pub fn open(path: &Path, busy_timeout_ms: u64) -> AppResult<Self> {
        let conn = Connection::open(path).map_err(AppError::from_storage)?;
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
            .map_err(AppError::from_storage)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::from_storage)?;
        Ok(Self { conn })
    }
}
