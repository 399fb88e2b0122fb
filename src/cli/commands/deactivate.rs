use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::assign::AssignLogic;
use crate::errors::AppResult;
use crate::ui::messages;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Deactivate { id } = cmd {
        let mut pool = open_pool(cfg)?;
        let duty = AssignLogic::deactivate(&mut pool, *id)?;
        messages::success(format!(
            "Duty #{} deactivated ({} {} {})",
            duty.id,
            duty.scholar_id,
            duty.day.to_db_str(),
            duty.window().label()
        ));
    }
    Ok(())
}
