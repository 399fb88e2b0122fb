//! Attendance event ingestion.
//!
//! Manual encodings, self photos and QR scans arrive in different shapes;
//! `normalize` turns each into one `AttendanceEvent` without judging
//! attendance. `record_event` appends the result to the evidence log.

use crate::db::events;
use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::evidence::{AttendanceEvent, EvidenceSource, RawEvent};
use chrono::{Duration, NaiveDateTime};
use rusqlite::{Transaction, TransactionBehavior};
use tracing::{debug, info, warn};

/// What happened to a raw event handed to `record_event`.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    /// New row in the evidence log.
    Appended(AttendanceEvent),
    /// Redelivery of evidence already stored; nothing written.
    Duplicate(AttendanceEvent),
    /// QR checkout closed an open check-in.
    CheckoutAttached(AttendanceEvent),
}

impl Recorded {
    pub fn event(&self) -> &AttendanceEvent {
        match self {
            Recorded::Appended(e) | Recorded::Duplicate(e) | Recorded::CheckoutAttached(e) => e,
        }
    }
}

fn required(value: &Option<String>, field: &str) -> AppResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::MalformedEvidence(format!("missing {}", field))),
    }
}

/// Canonical spelling for the two statuses checkers type; anything else is kept trimmed.
fn normalize_status(raw: &Option<String>) -> Option<String> {
    let s = raw.as_deref()?.trim();
    if s.is_empty() {
        return None;
    }
    Some(match s.to_lowercase().as_str() {
        "present" => "Present".to_string(),
        "absent" => "Absent".to_string(),
        _ => s.to_string(),
    })
}

pub struct Ingestor;

impl Ingestor {
    /// `Ingest`: validate and normalise. No storage access.
    pub fn normalize(raw: &RawEvent, recorded_at: NaiveDateTime) -> AppResult<AttendanceEvent> {
        let scholar_id = required(&raw.scholar_id, "scholar id")?;
        let location = required(&raw.location, "location")?;
        let occurred_at = raw
            .occurred_at
            .ok_or_else(|| AppError::MalformedEvidence("missing occurred_at".into()))?;

        if raw.checkout && raw.source != EvidenceSource::QrScan {
            return Err(AppError::MalformedEvidence(
                "only QR scans can be checkouts".into(),
            ));
        }

        let completed_at = match raw.source {
            // The photo itself is the proof; there is no checkout.
            EvidenceSource::SelfPhoto => None,
            EvidenceSource::QrScan if raw.checkout => Some(occurred_at),
            EvidenceSource::QrScan | EvidenceSource::ManualEncoding => raw.completed_at,
        };

        if let Some(done) = completed_at
            && done < occurred_at
        {
            return Err(AppError::MalformedEvidence(format!(
                "completed_at {} precedes occurred_at {}",
                done, occurred_at
            )));
        }

        Ok(AttendanceEvent {
            id: 0,
            scholar_id,
            source: raw.source,
            occurred_at,
            completed_at,
            location,
            raw_status: normalize_status(&raw.raw_status),
            reference: raw
                .reference
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            recorded_at,
        })
    }
}

/// `RecordEvent`: normalise and append. Identical redeliveries within `dedup_window`
/// return the stored event instead of appending a second one.
pub fn record_event(
    pool: &mut DbPool,
    raw: &RawEvent,
    dedup_window: Duration,
    now: NaiveDateTime,
) -> AppResult<Recorded> {
    let mut event = match Ingestor::normalize(raw, now) {
        Ok(ev) => ev,
        Err(e) => {
            warn!(source = raw.source.to_db_str(), error = %e, "evidence rejected");
            audit_quiet(
                &pool.conn,
                "reject",
                raw.source.to_db_str(),
                &format!(
                    "{} ({})",
                    e,
                    raw.scholar_id.as_deref().unwrap_or("unknown scholar")
                ),
            );
            return Err(e);
        }
    };

    let tx = Transaction::new_unchecked(&pool.conn, TransactionBehavior::Immediate)
        .map_err(AppError::from_storage)?;

    if raw.checkout {
        let at = event.occurred_at;

        if let Some(done) =
            events::find_by_completion(&tx, &event.scholar_id, &event.location, at)?
        {
            debug!(id = done.id, "checkout already applied");
            return Ok(Recorded::Duplicate(done));
        }

        if let Some(mut open) =
            events::find_open_qr_checkin(&tx, &event.scholar_id, &event.location, at)?
            && events::complete_event(&tx, open.id, at)?
        {
            open.completed_at = Some(at);
            audit_quiet(
                &tx,
                "checkout",
                &format!("event #{}", open.id),
                &format!("{} checked out at {}", open.scholar_id, at),
            );
            tx.commit().map_err(AppError::from_storage)?;
            info!(id = open.id, scholar = %open.scholar_id, "qr checkout attached");
            return Ok(Recorded::CheckoutAttached(open));
        }
    } else if let Some(existing) = events::find_near_duplicate(&tx, &event, dedup_window)? {
        debug!(id = existing.id, "duplicate evidence ignored");
        return Ok(Recorded::Duplicate(existing));
    }

    event.id = events::insert_event(&tx, &event)?;
    audit_quiet(
        &tx,
        "record",
        &format!("event #{}", event.id),
        &format!(
            "{} {} at {} ({})",
            event.scholar_id,
            event.source.to_db_str(),
            event.location,
            event.occurred_at
        ),
    );
    tx.commit().map_err(AppError::from_storage)?;

    info!(
        id = event.id,
        scholar = %event.scholar_id,
        source = event.source.to_db_str(),
        "evidence recorded"
    );
    Ok(Recorded::Appended(event))
}
