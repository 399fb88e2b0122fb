//! Reconciliation engine.
//!
//! Walks every calendar date of a range (oldest first), expands the active
//! duty schedules of that weekday into occurrences, evaluates each one and
//! persists the verdict through the guarded upserts of `ReconciledStore`.
//!
//! Per key the state only ever moves `∅ → Pending → {Present, Absent}`:
//! terminal records are skipped before evaluation and the store refuses to
//! overwrite them even if a concurrent caller wins the race.

use crate::core::evaluator::{Verdict, evaluate};
use crate::core::store::{AttendanceStore, ScheduleSource};
use crate::errors::{AppError, AppResult};
use crate::models::day::DutyDay;
use crate::models::occurrence::Occurrence;
use crate::models::record::{AbsenceMarker, AttendanceStatus, UpsertOutcome};
use crate::utils::date::{days_inclusive, yesterday_of};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Aggregate result of one `reconcile` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileCounts {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Occurrences whose evaluation failed; they keep their previous state.
    pub failed: usize,
    /// The walk stopped early on request; later dates were not visited.
    pub interrupted: bool,
}

impl ReconcileCounts {
    pub fn visited(&self) -> usize {
        self.created + self.updated + self.unchanged + self.failed
    }

    fn record(&mut self, outcome: OccurrenceOutcome) {
        match outcome {
            OccurrenceOutcome::Created => self.created += 1,
            OccurrenceOutcome::Updated => self.updated += 1,
            OccurrenceOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OccurrenceOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Which dates a call covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileScope {
    /// The most recently completed day (sweep).
    Yesterday,
    /// From the oldest schedule's creation date (or the fallback horizon) to today.
    Backfill,
    Range { from: NaiveDate, to: NaiveDate },
}

/// Turn a scope into a concrete `[from, to]`.
pub fn resolve_range<S: ScheduleSource + ?Sized>(
    store: &S,
    scope: ReconcileScope,
    scholar_id: Option<&str>,
    today: NaiveDate,
    fallback_days: i64,
) -> AppResult<(NaiveDate, NaiveDate)> {
    match scope {
        ReconcileScope::Yesterday => {
            let y = yesterday_of(today);
            Ok((y, y))
        }
        ReconcileScope::Backfill => {
            let from = store
                .earliest_schedule_date(scholar_id)?
                .unwrap_or(today - Duration::days(fallback_days));
            Ok((from.min(today), today))
        }
        ReconcileScope::Range { from, to } => Ok((from, to)),
    }
}

/// `Reconcile(scholarId?, from, to)`.
pub fn reconcile<S: AttendanceStore + ?Sized>(
    store: &S,
    scholar_id: Option<&str>,
    from: NaiveDate,
    to: NaiveDate,
    now: NaiveDateTime,
) -> AppResult<ReconcileCounts> {
    reconcile_until(store, scholar_id, from, to, now, &AtomicBool::new(false))
}

/// Same as `reconcile`, checking `stop` before every date. Everything done
/// before the stop is durable, so a later call simply resumes.
pub fn reconcile_until<S: AttendanceStore + ?Sized>(
    store: &S,
    scholar_id: Option<&str>,
    from: NaiveDate,
    to: NaiveDate,
    now: NaiveDateTime,
    stop: &AtomicBool,
) -> AppResult<ReconcileCounts> {
    let mut counts = ReconcileCounts::default();

    if from > to {
        debug!(%from, %to, "empty reconcile range");
        return Ok(counts);
    }

    info!(
        scholar = scholar_id.unwrap_or("ALL"),
        %from,
        %to,
        %now,
        "reconcile started"
    );

    for date in days_inclusive(from, to) {
        if stop.load(Ordering::Relaxed) {
            warn!(%date, "reconcile interrupted");
            counts.interrupted = true;
            break;
        }

        let Some(day) = DutyDay::of_date(date) else {
            continue;
        };

        // Without the schedule list nothing for this date can be judged.
        let schedules = store.list_active_schedules(scholar_id, Some(day))?;

        for schedule in schedules {
            let occ = Occurrence::new(date, schedule);
            // Shifts that began before the duty was assigned are not owed.
            if occ.schedule.created_at > occ.starts_at() {
                continue;
            }

            match reconcile_occurrence(store, &occ, now) {
                Ok(outcome) => counts.record(outcome),
                Err(e) if e.is_storage_unavailable() => {
                    error!(key = %occ.key(), error = %e, "storage unavailable, aborting reconcile");
                    return Err(e);
                }
                Err(e) => {
                    warn!(key = %occ.key(), error = %e, "occurrence left for the next run");
                    counts.failed += 1;
                }
            }
        }
    }

    info!(
        created = counts.created,
        updated = counts.updated,
        unchanged = counts.unchanged,
        failed = counts.failed,
        interrupted = counts.interrupted,
        "reconcile finished"
    );
    Ok(counts)
}

/// Resolve `scope` and reconcile it. Sweep and on-demand callers both land here.
pub fn reconcile_scope<S: AttendanceStore + ?Sized>(
    store: &S,
    scope: ReconcileScope,
    scholar_id: Option<&str>,
    now: NaiveDateTime,
    fallback_days: i64,
    stop: &AtomicBool,
) -> AppResult<ReconcileCounts> {
    let (from, to) = resolve_range(store, scope, scholar_id, now.date(), fallback_days)?;
    reconcile_until(store, scholar_id, from, to, now, stop)
}

fn isolate(key: &str, err: AppError) -> AppError {
    if err.is_storage_unavailable() {
        err
    } else {
        AppError::OccurrenceEvaluation {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }
}

fn absence_marker(occ: &Occurrence) -> AbsenceMarker {
    AbsenceMarker {
        scholar_id: occ.scholar_id().to_string(),
        date: occ.date,
        location: occ.location().to_string(),
        time_window: occ.schedule.window().label(),
    }
}

/// Write the marker for `occ` when its own evidence judges it Absent.
///
/// Every window of a scholar on one day and location shares a record, so a
/// terminal Absent only says that some window was missed. Windows that have
/// not ended, or whose evidence satisfies a rule, get no marker.
fn heal_marker<S: AttendanceStore + ?Sized>(
    store: &S,
    occ: &Occurrence,
    now: NaiveDateTime,
    key_str: &str,
) -> AppResult<()> {
    if now < occ.ends_at() {
        return Ok(());
    }
    let events = store
        .query_events(occ.scholar_id(), occ.date, occ.location())
        .map_err(|e| isolate(key_str, e))?;
    if evaluate(occ, &events, now) == Verdict::Absent {
        store
            .upsert_absence_marker(&absence_marker(occ))
            .map_err(|e| isolate(key_str, e))?;
    }
    Ok(())
}

fn reconcile_occurrence<S: AttendanceStore + ?Sized>(
    store: &S,
    occ: &Occurrence,
    now: NaiveDateTime,
) -> AppResult<OccurrenceOutcome> {
    let key = occ.key();
    let key_str = key.to_string();

    let existing = store.get_record(&key).map_err(|e| isolate(&key_str, e))?;

    if let Some(rec) = &existing
        && rec.status.is_terminal()
    {
        // Covers a run that died between the record and its marker, and
        // later windows sharing the key. The marker upsert is idempotent.
        if rec.status == AttendanceStatus::Absent {
            heal_marker(store, occ, now, &key_str)?;
        }
        return Ok(OccurrenceOutcome::Unchanged);
    }

    let events = store
        .query_events(occ.scholar_id(), occ.date, occ.location())
        .map_err(|e| isolate(&key_str, e))?;

    let verdict = evaluate(occ, &events, now);

    let (evidence_ref, verified_at) = match &verdict {
        Verdict::Pending if existing.is_some() => return Ok(OccurrenceOutcome::Unchanged),
        Verdict::Present {
            evidence_id,
            verified_at,
            ..
        } => (Some(*evidence_id), Some(*verified_at)),
        Verdict::Pending | Verdict::Absent => (None, None),
    };

    let status = verdict.status();
    let written = store
        .upsert_if_not_terminal(&key, status, evidence_ref, verified_at)
        .map_err(|e| isolate(&key_str, e))?;

    if written == UpsertOutcome::Skipped {
        // Another caller made the key terminal between our read and write.
        debug!(key = %key_str, "record became terminal concurrently");
        let current = store.get_record(&key).map_err(|e| isolate(&key_str, e))?;
        if verdict == Verdict::Absent
            && current.map(|r| r.status) == Some(AttendanceStatus::Absent)
        {
            store
                .upsert_absence_marker(&absence_marker(occ))
                .map_err(|e| isolate(&key_str, e))?;
        }
        return Ok(OccurrenceOutcome::Unchanged);
    }

    if status == AttendanceStatus::Absent {
        store
            .upsert_absence_marker(&absence_marker(occ))
            .map_err(|e| isolate(&key_str, e))?;
    }

    debug!(key = %key_str, %status, "occurrence reconciled");

    Ok(if existing.is_some() {
        OccurrenceOutcome::Updated
    } else {
        OccurrenceOutcome::Created
    })
}
