//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use rusqlite::ErrorCode;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid duty day: {0}")]
    InvalidDay(String),

    #[error("Invalid duty kind: {0}")]
    InvalidDutyKind(String),

    #[error("Invalid evidence source: {0}")]
    InvalidSource(String),

    // ---------------------------
    // Scheduling errors
    // ---------------------------
    #[error("Invalid duty window: {0}")]
    InvalidWindow(String),

    #[error("Schedule conflict with duty #{existing_id} ({day} {window})")]
    ScheduleConflict {
        existing_id: i64,
        day: String,
        window: String,
    },

    #[error("Scholar {scholar_id} already has {limit} active duties")]
    ScheduleLimit { scholar_id: String, limit: usize },

    #[error("Unknown duty schedule #{0}")]
    UnknownSchedule(i64),

    // ---------------------------
    // Evidence / reconciliation errors
    // ---------------------------
    #[error("Malformed evidence: {0}")]
    MalformedEvidence(String),

    #[error("Occurrence evaluation failed for {key}: {reason}")]
    OccurrenceEvaluation { key: String, reason: String },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Classify a sqlite failure: conditions that make the whole store
    /// unreachable become `StorageUnavailable`, everything else stays `Db`.
    pub fn from_storage(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref ffi, _) = err {
            match ffi.code {
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::NotADatabase
                | ErrorCode::DiskFull
                | ErrorCode::ReadOnly => return AppError::StorageUnavailable(err.to_string()),
                _ => {}
            }
        }
        AppError::Db(err)
    }

    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, AppError::StorageUnavailable(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
