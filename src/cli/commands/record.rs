use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ingest::{Recorded, record_event};
use crate::errors::{AppError, AppResult};
use crate::models::evidence::{EvidenceSource, RawEvent};
use crate::ui::messages;
use crate::utils::date::parse_datetime;
use chrono::{Duration, NaiveDateTime};

fn parse_ts(s: &str) -> AppResult<NaiveDateTime> {
    parse_datetime(s).ok_or_else(|| AppError::InvalidDate(s.to_string()))
}

/// Print the outcome of one ingestion the same way for `record` and `import`.
pub(crate) fn report(outcome: &Recorded) {
    let ev = outcome.event();
    match outcome {
        Recorded::Appended(_) => messages::success(format!(
            "Evidence #{} recorded: {} {} at {} ({})",
            ev.id,
            ev.scholar_id,
            ev.source.to_db_str(),
            ev.location,
            ev.occurred_at
        )),
        Recorded::Duplicate(_) => messages::info(format!(
            "Duplicate of evidence #{} ignored",
            ev.id
        )),
        Recorded::CheckoutAttached(_) => messages::success(format!(
            "Checkout attached to evidence #{} ({} at {})",
            ev.id,
            ev.scholar_id,
            ev.completed_at.map(|t| t.to_string()).unwrap_or_default()
        )),
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Record {
        source,
        scholar,
        at,
        location,
        status,
        completed,
        checkout,
        reference,
    } = cmd
    {
        let source = EvidenceSource::from_code(source)
            .ok_or_else(|| AppError::InvalidSource(source.to_string()))?;

        let raw = RawEvent {
            scholar_id: Some(scholar.clone()),
            occurred_at: Some(parse_ts(at)?),
            completed_at: completed.as_deref().map(parse_ts).transpose()?,
            location: Some(location.clone()),
            raw_status: status.clone(),
            reference: reference.clone(),
            checkout: *checkout,
            ..RawEvent::new(source)
        };

        let mut pool = open_pool(cfg)?;
        let now = chrono::Local::now().naive_local();
        let outcome = record_event(
            &mut pool,
            &raw,
            Duration::minutes(cfg.dedup_window_minutes),
            now,
        )?;

        report(&outcome);
    }
    Ok(())
}
