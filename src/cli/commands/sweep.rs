use crate::cli::commands::clock_from;
use crate::cli::commands::open_pool;
use crate::cli::commands::reconcile::summary;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::sweep::SweepScheduler;
use crate::errors::AppResult;
use crate::ui::messages;
use std::sync::mpsc;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sweep { once, now } = cmd {
        // Schema first: ticks open plain connections.
        drop(open_pool(cfg)?);

        let scheduler = SweepScheduler::new(cfg, clock_from(now)?)?;

        if *once {
            if let Some(counts) = scheduler.tick()? {
                messages::success(format!("Sweep completed: {}", summary(&counts)));
            }
            return Ok(());
        }

        messages::info(format!(
            "Sweep scheduler running, daily at {} (Ctrl+C to stop)",
            scheduler.fire_at().format("%H:%M")
        ));

        // The sender stays alive for the life of the process.
        let (_stop_tx, stop_rx) = mpsc::channel::<()>();
        scheduler.run_until_stopped(&stop_rx);
    }
    Ok(())
}
