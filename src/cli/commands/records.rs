use crate::cli::commands::{open_pool, parse_optional_date};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::records::list_records;
use crate::errors::AppResult;
use crate::utils::colors::{RESET, color_for_status};
use crate::utils::date::format_datetime;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Records { scholar, from, to } = cmd {
        let from = parse_optional_date(from)?;
        let to = parse_optional_date(to)?;

        let pool = open_pool(cfg)?;
        let records = list_records(&pool.conn, scholar.as_deref(), from, to)?;

        if records.is_empty() {
            println!("No reconciled records found.");
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column::new("DATE", 10),
            Column::new("SCHOLAR", 12),
            Column::new("LOCATION", 14),
            Column::new("STATUS", 7),
            Column::new("EVIDENCE", 8),
            Column::new("VERIFIED", 19),
        ]);

        for r in &records {
            table.add_row(vec![
                r.key.schedule_date.to_string(),
                r.key.scholar_id.clone(),
                r.key.location.clone(),
                r.status.to_string(),
                r.evidence_ref.map(|id| format!("#{}", id)).unwrap_or_else(|| "--".into()),
                r.verified_at
                    .as_ref()
                    .map(format_datetime)
                    .unwrap_or_else(|| "--".into()),
            ]);
        }

        // Status colour is applied per line, after padding.
        let rendered = table.render();
        let mut lines = rendered.lines();
        if let Some(header) = lines.next() {
            println!("{}", header);
        }
        for (line, r) in lines.zip(&records) {
            println!("{}{}{}", color_for_status(r.status), line, RESET);
        }
    }
    Ok(())
}
