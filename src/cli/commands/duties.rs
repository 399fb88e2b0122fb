use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::schedules::list_schedules;
use crate::errors::AppResult;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Duties { scholar, all } = cmd {
        let pool = open_pool(cfg)?;
        let duties = list_schedules(&pool.conn, scholar.as_deref(), None, !*all)?;

        if duties.is_empty() {
            println!("No duties found.");
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column::new("ID", 4),
            Column::new("SCHOLAR", 12),
            Column::new("DAY", 9),
            Column::new("WINDOW", 11),
            Column::new("LOCATION", 14),
            Column::new("KIND", 17),
            Column::new("SINCE", 10),
        ]);

        for d in &duties {
            // Colour codes would break the column padding.
            let kind = if d.active {
                d.kind.label().to_string()
            } else {
                format!("{} (off)", d.kind.label())
            };
            table.add_row(vec![
                d.id.to_string(),
                d.scholar_id.clone(),
                d.day.to_db_str().to_string(),
                d.window().label(),
                d.location.clone(),
                kind,
                d.created_at.date().to_string(),
            ]);
        }

        print!("{}", table.render());
    }
    Ok(())
}
