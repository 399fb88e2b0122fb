use crate::cli::commands::{clock_from, open_pool, parse_optional_date};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::reconcile::{ReconcileCounts, ReconcileScope, reconcile, resolve_range};
use crate::db::log::audit_quiet;
use crate::errors::AppResult;
use crate::utils::clock::Clock;
use crate::ui::messages;

pub(crate) fn summary(counts: &ReconcileCounts) -> String {
    format!(
        "created {}, updated {}, unchanged {}, failed {}",
        counts.created, counts.updated, counts.unchanged, counts.failed
    )
}

/// On-demand reconciliation. Without a range this covers yesterday, exactly
/// like the daily sweep.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Reconcile {
        scholar,
        from,
        to,
        backfill,
        now,
    } = cmd
    {
        let now = clock_from(now)?.now();
        let from = parse_optional_date(from)?;
        let to = parse_optional_date(to)?;

        let scope = match (*backfill, from, to) {
            (true, _, _) => ReconcileScope::Backfill,
            (false, Some(from), to) => ReconcileScope::Range {
                from,
                to: to.unwrap_or(now.date()),
            },
            (false, None, Some(to)) => ReconcileScope::Range { from: to, to },
            (false, None, None) => ReconcileScope::Yesterday,
        };

        let pool = open_pool(cfg)?;
        let scholar = scholar.as_deref();
        let (from, to) = resolve_range(
            &pool,
            scope,
            scholar,
            now.date(),
            cfg.backfill_fallback_days,
        )?;

        let counts = reconcile(&pool, scholar, from, to, now)?;

        audit_quiet(
            &pool.conn,
            "reconcile",
            &format!("{} {}..{}", scholar.unwrap_or("ALL"), from, to),
            &summary(&counts),
        );

        messages::success(format!("Reconciled {} to {}: {}", from, to, summary(&counts)));
        if counts.failed > 0 {
            messages::warning(format!(
                "{} occurrence(s) could not be evaluated and will be retried on the next run",
                counts.failed
            ));
        }
    }
    Ok(())
}
