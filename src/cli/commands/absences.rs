use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::records::{count_absences, list_absences};
use crate::errors::AppResult;
use crate::ui::messages;
use crate::utils::colors::{RED, RESET};
use crate::utils::table::{Column, Table};

/// A scholar's absences, newest first, with the total.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Absences { scholar } = cmd {
        let pool = open_pool(cfg)?;
        let absences = list_absences(&pool.conn, scholar)?;
        let total = count_absences(&pool.conn, scholar)?;

        messages::header(format!("Absences of {}", scholar));
        println!("Total: {}{}{}", RED, total, RESET);
        if absences.is_empty() {
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column::new("DATE", 10),
            Column::new("LOCATION", 14),
            Column::new("WINDOW", 11),
        ]);
        for a in &absences {
            table.add_row(vec![a.date.to_string(), a.location.clone(), a.time_window.clone()]);
        }
        print!("{}", table.render());
    }
    Ok(())
}
