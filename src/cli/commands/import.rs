use crate::cli::commands::open_pool;
use crate::cli::commands::record::report;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ingest::record_event;
use crate::errors::{AppError, AppResult};
use crate::models::evidence::RawEvent;
use crate::ui::messages;
use chrono::Duration;
use std::fs;

/// Feed a JSON array of raw events through the ingestor. Malformed entries
/// are reported and skipped; the rest are still recorded.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Import { file } = cmd {
        let content = fs::read_to_string(file)?;
        let batch: Vec<RawEvent> = serde_json::from_str(&content)
            .map_err(|e| AppError::MalformedEvidence(format!("{}: {}", file, e)))?;

        let mut pool = open_pool(cfg)?;
        let window = Duration::minutes(cfg.dedup_window_minutes);
        let now = chrono::Local::now().naive_local();

        let mut rejected = 0usize;
        for (i, raw) in batch.iter().enumerate() {
            match record_event(&mut pool, raw, window, now) {
                Ok(outcome) => report(&outcome),
                Err(e @ AppError::MalformedEvidence(_)) => {
                    rejected += 1;
                    messages::warning(format!("entry {}: {}", i + 1, e));
                }
                Err(e) => return Err(e),
            }
        }

        messages::info(format!(
            "{} event(s) processed, {} rejected",
            batch.len(),
            rejected
        ));
    }
    Ok(())
}
