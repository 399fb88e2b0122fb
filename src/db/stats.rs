use crate::db::migrate::applied_versions;
use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

fn count(pool: &DbPool, sql: &str) -> rusqlite::Result<i64> {
    pool.conn.query_row(sql, [], |row| row.get(0))
}

pub fn print_db_info(pool: &DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROW COUNTS
    //
    let duties = count(pool, "SELECT COUNT(*) FROM duty_schedules WHERE active = 1")?;
    let events = count(pool, "SELECT COUNT(*) FROM attendance_events")?;
    let records = count(pool, "SELECT COUNT(*) FROM reconciled_records")?;
    let pending = count(
        pool,
        "SELECT COUNT(*) FROM reconciled_records WHERE status = 'Pending'",
    )?;
    let absences = count(pool, "SELECT COUNT(*) FROM absence_markers")?;

    println!("{}• Active duties:{} {}{}{}", CYAN, RESET, GREEN, duties, RESET);
    println!("{}• Evidence events:{} {}{}{}", CYAN, RESET, GREEN, events, RESET);
    println!(
        "{}• Reconciled records:{} {}{}{} ({} pending)",
        CYAN, RESET, GREEN, records, RESET, pending
    );
    println!("{}• Absence markers:{} {}{}{}", CYAN, RESET, GREEN, absences, RESET);

    //
    // 3) RECONCILED RANGE
    //
    let first_date: Option<String> = pool
        .conn
        .query_row("SELECT MIN(schedule_date) FROM reconciled_records", [], |row| {
            row.get(0)
        })
        .optional()?
        .flatten();
    let last_date: Option<String> = pool
        .conn
        .query_row("SELECT MAX(schedule_date) FROM reconciled_records", [], |row| {
            row.get(0)
        })
        .optional()?
        .flatten();

    println!("{}• Reconciled range:{}", CYAN, RESET);
    println!(
        "    from: {}",
        first_date.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );
    println!(
        "    to:   {}",
        last_date.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );

    //
    // 4) SCHEMA
    //
    let versions = applied_versions(&pool.conn)?;
    println!(
        "{}• Migrations:{} {}",
        CYAN,
        RESET,
        versions.last().map(String::as_str).unwrap_or("--")
    );

    println!();
    Ok(())
}
