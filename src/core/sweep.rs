//! Daily sweep: reconcile the previous day once per day at a fixed local time.

use crate::config::Config;
use crate::core::reconcile::{ReconcileCounts, ReconcileScope, reconcile_scope};
use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::clock::Clock;
use crate::utils::date::yesterday_of;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use tracing::{debug, error, info, warn};

/// First instant strictly after `now` whose wall-clock time is `at`.
pub fn next_fire_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let same_day = now.date().and_time(at);
    if same_day > now {
        same_day
    } else {
        (now.date() + Duration::days(1)).and_time(at)
    }
}

/// Releases the re-entrancy flag when a tick ends, even on error.
struct TickGuard<'a>(&'a AtomicBool);

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SweepScheduler {
    fire_at: NaiveTime,
    db_path: PathBuf,
    busy_timeout_ms: u64,
    fallback_days: i64,
    clock: Arc<dyn Clock>,
    running: AtomicBool,
}

impl SweepScheduler {
    pub fn new(cfg: &Config, clock: Arc<dyn Clock>) -> AppResult<Self> {
        Ok(Self {
            fire_at: cfg.sweep_at()?,
            db_path: cfg.database_path(),
            busy_timeout_ms: cfg.busy_timeout_ms,
            fallback_days: cfg.backfill_fallback_days,
            clock,
            running: AtomicBool::new(false),
        })
    }

    pub fn fire_at(&self) -> NaiveTime {
        self.fire_at
    }

    /// One sweep over yesterday. Returns `Ok(None)` when another tick of this
    /// scheduler is still running.
    pub fn tick(&self) -> AppResult<Option<ReconcileCounts>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            warn!("previous sweep still running, tick skipped");
            return Ok(None);
        }
        let _guard = TickGuard(&self.running);

        let now = self.clock.now();
        let day = yesterday_of(now.date());

        // Own connection per tick; a long-running loop never holds one open.
        let pool = DbPool::open(&self.db_path, self.busy_timeout_ms)?;
        // A tick covers a single date, so there is nothing to interrupt.
        let never = AtomicBool::new(false);

        match reconcile_scope(
            &pool,
            ReconcileScope::Yesterday,
            None,
            now,
            self.fallback_days,
            &never,
        ) {
            Ok(counts) => {
                audit_quiet(
                    &pool.conn,
                    "sweep",
                    &day.to_string(),
                    &format!(
                        "created={} updated={} unchanged={} failed={}",
                        counts.created, counts.updated, counts.unchanged, counts.failed
                    ),
                );
                info!(%day, created = counts.created, updated = counts.updated, "sweep completed");
                Ok(Some(counts))
            }
            Err(e) => {
                error!(%day, error = %e, "sweep failed, waiting for next tick");
                audit_quiet(&pool.conn, "sweep", &day.to_string(), &format!("failed: {}", e));
                Err(e)
            }
        }
    }

    /// Fire `tick` every day at `fire_at` until `stop` receives a message or
    /// its sender is dropped. A failed tick is not retried before the next one.
    pub fn run_until_stopped(&self, stop: &Receiver<()>) {
        loop {
            let now = self.clock.now();
            let next = next_fire_after(now, self.fire_at);
            let wait = (next - now).to_std().unwrap_or_default();
            info!(%next, "next sweep scheduled");

            match stop.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(e) = self.tick() {
                        debug!(error = %e, "sweep tick failed, retrying at next fire time");
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    info!("sweep scheduler stopped");
                    break;
                }
            }
        }
    }
}
