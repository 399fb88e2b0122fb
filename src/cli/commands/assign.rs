use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::assign::{AssignLogic, DutyRequest};
use crate::errors::{AppError, AppResult};
use crate::models::day::DutyDay;
use crate::models::duty_kind::DutyKind;
use crate::ui::messages;
use crate::utils::time::parse_required_time;

/// Assign a weekly duty, or replace one with `--edit`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Assign {
        scholar,
        day,
        start,
        end,
        location,
        kind,
        edit,
    } = cmd
    {
        //
        // 1. Parse the form fields
        //
        let day = DutyDay::from_code(day).ok_or_else(|| AppError::InvalidDay(day.to_string()))?;
        let kind =
            DutyKind::from_code(kind).ok_or_else(|| AppError::InvalidDutyKind(kind.to_string()))?;
        let start = parse_required_time(start)?;
        let end = parse_required_time(end)?;

        let req = DutyRequest {
            scholar_id: scholar.clone(),
            day,
            start,
            end,
            location: location.clone(),
            kind,
        };

        //
        // 2. Validate and persist
        //
        let mut pool = open_pool(cfg)?;
        let now = chrono::Local::now().naive_local();
        let saved = AssignLogic::apply(
            &mut pool,
            &req,
            *edit,
            cfg.max_schedules_per_scholar,
            now,
        )?;

        messages::success(format!(
            "Duty #{} saved: {} {} {} at {} ({})",
            saved.id,
            saved.scholar_id,
            saved.day.to_db_str(),
            saved.window().label(),
            saved.location,
            saved.kind.label()
        ));
    }
    Ok(())
}
