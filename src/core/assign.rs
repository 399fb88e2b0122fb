use crate::core::overlap::{ensure_no_conflict, validate_window};
use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::db::schedules;
use crate::errors::{AppError, AppResult};
use crate::models::day::DutyDay;
use crate::models::duty_kind::DutyKind;
use crate::models::schedule::DutySchedule;
use chrono::{NaiveDateTime, NaiveTime};
use rusqlite::{Transaction, TransactionBehavior};
use tracing::info;

/// Location given to checker duties assigned without a room.
pub const UNASSIGNED_LOCATION: &str = "Unassigned";

/// A requested duty window, as entered on the assignment form.
#[derive(Debug, Clone)]
pub struct DutyRequest {
    pub scholar_id: String,
    pub day: DutyDay,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub location: Option<String>,
    pub kind: DutyKind,
}

/// High-level business logic for the `assign` and `deactivate` commands.
pub struct AssignLogic;

impl AssignLogic {
    /// Validate the request and persist it (insert, or update `edit_id`).
    ///
    /// Checks run inside an IMMEDIATE transaction so two concurrent
    /// assignments for the same scholar cannot both pass the overlap test.
    pub fn apply(
        pool: &mut DbPool,
        req: &DutyRequest,
        edit_id: Option<i64>,
        max_per_scholar: usize,
        now: NaiveDateTime,
    ) -> AppResult<DutySchedule> {
        let scholar_id = req.scholar_id.trim();
        if scholar_id.is_empty() {
            return Err(AppError::Other("scholar id is required".into()));
        }

        let location = match (req.location.as_deref().map(str::trim), req.kind) {
            (Some(l), _) if !l.is_empty() => l.to_string(),
            (_, DutyKind::Checker) => UNASSIGNED_LOCATION.to_string(),
            (_, DutyKind::Facilitator) => {
                return Err(AppError::Other(
                    "a location is required for facilitator duties".into(),
                ));
            }
        };

        validate_window(req.start, req.end)?;

        let tx = Transaction::new_unchecked(&pool.conn, TransactionBehavior::Immediate)
            .map_err(AppError::from_storage)?;

        let previous = match edit_id {
            Some(id) => Some(schedules::get_schedule(&tx, id)?.ok_or(AppError::UnknownSchedule(id))?),
            None => None,
        };

        let existing = schedules::list_schedules(&tx, Some(scholar_id), None, true)?;

        let others = existing.iter().filter(|s| Some(s.id) != edit_id).count();
        if others >= max_per_scholar {
            return Err(AppError::ScheduleLimit {
                scholar_id: scholar_id.to_string(),
                limit: max_per_scholar,
            });
        }

        ensure_no_conflict(&existing, scholar_id, req.day, req.start, req.end, edit_id)?;

        let mut schedule = DutySchedule {
            id: edit_id.unwrap_or(0),
            scholar_id: scholar_id.to_string(),
            day: req.day,
            start_time: req.start,
            end_time: req.end,
            location,
            kind: req.kind,
            active: true,
            created_at: previous.as_ref().map(|p| p.created_at).unwrap_or(now),
        };

        let operation = if previous.is_some() {
            schedules::update_schedule(&tx, &schedule)?;
            "edit"
        } else {
            schedule.id = schedules::insert_schedule(&tx, &schedule)?;
            "assign"
        };

        audit_quiet(
            &tx,
            operation,
            &format!("duty #{}", schedule.id),
            &format!(
                "{} {} {} at {} ({})",
                schedule.scholar_id,
                schedule.day.to_db_str(),
                schedule.window().label(),
                schedule.location,
                schedule.kind.label()
            ),
        );

        tx.commit().map_err(AppError::from_storage)?;

        info!(
            id = schedule.id,
            scholar = %schedule.scholar_id,
            day = schedule.day.to_db_str(),
            window = %schedule.window().label(),
            operation,
            "duty saved"
        );
        Ok(schedule)
    }

    /// Deactivated duties stop producing occurrences; history stays intact.
    pub fn deactivate(pool: &mut DbPool, id: i64) -> AppResult<DutySchedule> {
        let mut schedule = schedules::get_schedule(&pool.conn, id)?.ok_or(AppError::UnknownSchedule(id))?;
        if schedule.active {
            schedules::deactivate_schedule(&pool.conn, id)?;
            schedule.active = false;
            audit_quiet(
                &pool.conn,
                "deactivate",
                &format!("duty #{}", id),
                &format!("{} {}", schedule.scholar_id, schedule.day.to_db_str()),
            );
            info!(id, "duty deactivated");
        }
        Ok(schedule)
    }
}
