use rusqlite::{Connection, OptionalExtension, Result};
use tracing::{debug, info};

/// Ensure that the `log` table exists; it also records applied migrations.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    info!(version, "migration applied");
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn create_duty_schedules(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS duty_schedules (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            scholar_id  TEXT NOT NULL,
            day         TEXT NOT NULL CHECK(day IN ('Monday','Tuesday','Wednesday','Thursday','Friday')),
            start_time  TEXT NOT NULL,
            end_time    TEXT NOT NULL,
            location    TEXT NOT NULL,
            kind        TEXT NOT NULL DEFAULT 'facilitator' CHECK(kind IN ('facilitator','checker')),
            active      INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_duty_scholar_day ON duty_schedules(scholar_id, day);
        CREATE INDEX IF NOT EXISTS idx_duty_day_active ON duty_schedules(day, active);
        "#,
    )
}

fn create_attendance_events(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_events (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            scholar_id    TEXT NOT NULL,
            source        TEXT NOT NULL CHECK(source IN ('manual_encoding','self_photo','qr_scan')),
            occurred_at   TEXT NOT NULL,
            completed_at  TEXT,
            location      TEXT NOT NULL,
            raw_status    TEXT,
            recorded_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_events_scholar_loc_time
            ON attendance_events(scholar_id, location, occurred_at);
        "#,
    )
}

fn create_reconciled_records(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS reconciled_records (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            scholar_id     TEXT NOT NULL,
            schedule_date  TEXT NOT NULL,
            location       TEXT NOT NULL,
            status         TEXT NOT NULL DEFAULT 'Pending' CHECK(status IN ('Pending','Present','Absent')),
            evidence_ref   INTEGER REFERENCES attendance_events(id),
            verified_at    TEXT,
            updated_at     TEXT NOT NULL,
            UNIQUE(scholar_id, schedule_date, location)
        );

        CREATE INDEX IF NOT EXISTS idx_records_date ON reconciled_records(schedule_date);
        "#,
    )
}

fn create_absence_markers(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS absence_markers (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            scholar_id   TEXT NOT NULL,
            date         TEXT NOT NULL,
            location     TEXT NOT NULL,
            time_window  TEXT NOT NULL,
            created_at   TEXT NOT NULL,
            UNIQUE(scholar_id, date, location, time_window)
        );
        "#,
    )
}

/// Events gained a free-form `reference` (photo id, checker id, QR payload).
fn add_event_reference(conn: &Connection) -> Result<()> {
    if table_has_column(conn, "attendance_events", "reference")? {
        return Ok(());
    }
    conn.execute(
        "ALTER TABLE attendance_events ADD COLUMN reference TEXT;",
        [],
    )?;
    Ok(())
}

type Step = fn(&Connection) -> Result<()>;

const MIGRATIONS: [(&str, &str, Step); 5] = [
    (
        "20250601_0001_create_duty_schedules",
        "Created duty_schedules table",
        create_duty_schedules,
    ),
    (
        "20250601_0002_create_attendance_events",
        "Created attendance_events table",
        create_attendance_events,
    ),
    (
        "20250601_0003_create_reconciled_records",
        "Created reconciled_records table",
        create_reconciled_records,
    ),
    (
        "20250601_0004_create_absence_markers",
        "Created absence_markers table",
        create_absence_markers,
    ),
    (
        "20250712_0005_add_event_reference",
        "Added reference column to attendance_events",
        add_event_reference,
    ),
];

/// Public entry point: run all pending migrations.
///
/// Every step is idempotent on its own, so two processes racing through
/// init at worst both mark the same version.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for (version, message, step) in MIGRATIONS {
        if is_applied(conn, version)? {
            debug!(version, "migration already applied");
            continue;
        }
        step(conn)?;
        mark_applied(conn, version, message)?;
    }

    Ok(())
}

/// Versions recorded as applied, oldest first.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
