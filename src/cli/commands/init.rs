use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file
///  - the SQLite database with all pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;
    let db_path = cfg.database_path();

    println!("⚙️  Initializing dutytracker…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", db_path.display());

    let pool = DbPool::open(&db_path, cfg.busy_timeout_ms)?;
    init_db(&pool.conn)?;

    audit_quiet(
        &pool.conn,
        "init",
        "database",
        &format!("Database initialized at {}", db_path.display()),
    );

    messages::success(format!("Database initialized at {}", db_path.display()));
    Ok(())
}
