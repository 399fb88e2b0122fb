use clap::{Parser, Subcommand};

/// Command-line interface definition for dutytracker
/// CLI application to schedule scholarship duties and reconcile attendance with SQLite
#[derive(Parser)]
#[command(
    name = "dutytracker",
    version = env!("CARGO_PKG_VERSION"),
    about = "Scholarship duty scheduling and attendance reconciliation on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/vim/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Assign a weekly duty to a scholar, or edit an existing one
    Assign {
        /// Scholar identifier
        scholar: String,

        #[arg(long = "day", help = "Weekday: mon, tue, wed, thu, fri")]
        day: String,

        #[arg(long = "start", help = "Start time (HH:MM or h:mm AM/PM, half-hour grid)")]
        start: String,

        #[arg(long = "end", help = "End time (HH:MM or h:mm AM/PM, half-hour grid)")]
        end: String,

        #[arg(long = "location", help = "Room or place of the duty")]
        location: Option<String>,

        #[arg(
            long = "kind",
            default_value = "facilitator",
            help = "Duty kind: facilitator or checker"
        )]
        kind: String,

        #[arg(long = "edit", value_name = "ID", help = "Duty id to replace instead of adding")]
        edit: Option<i64>,
    },

    /// Deactivate a duty (it stops producing occurrences)
    Deactivate {
        /// Duty id
        id: i64,
    },

    /// List duty schedules
    Duties {
        #[arg(long = "scholar")]
        scholar: Option<String>,

        #[arg(long = "all", help = "Include deactivated duties")]
        all: bool,
    },

    /// Record one piece of attendance evidence
    Record {
        #[arg(long = "source", help = "Evidence source: manual, photo or qr")]
        source: String,

        #[arg(long = "scholar")]
        scholar: String,

        #[arg(long = "at", help = "When it happened (YYYY-MM-DD HH:MM)")]
        at: String,

        #[arg(long = "location")]
        location: String,

        #[arg(long = "status", help = "Status text typed by the checker (manual only)")]
        status: Option<String>,

        #[arg(long = "completed", help = "Checkout time (YYYY-MM-DD HH:MM)")]
        completed: Option<String>,

        #[arg(long = "checkout", help = "QR scan that closes an open check-in")]
        checkout: bool,

        #[arg(long = "reference", help = "Photo or scan reference")]
        reference: Option<String>,
    },

    /// Record a batch of raw events from a JSON file
    Import {
        /// JSON array of events (source, scholar_id, occurred_at, location, ...)
        file: String,
    },

    /// Reconcile duty occurrences against recorded evidence
    Reconcile {
        #[arg(long = "scholar")]
        scholar: Option<String>,

        #[arg(long = "from", help = "First date (YYYY-MM-DD)")]
        from: Option<String>,

        #[arg(long = "to", help = "Last date (YYYY-MM-DD), defaults to today")]
        to: Option<String>,

        #[arg(
            long = "backfill",
            conflicts_with_all = ["from", "to"],
            help = "From the oldest duty's creation date to today"
        )]
        backfill: bool,

        #[arg(long = "now", help = "Override the current time (YYYY-MM-DD HH:MM)")]
        now: Option<String>,
    },

    /// List reconciled records
    Records {
        #[arg(long = "scholar")]
        scholar: Option<String>,

        #[arg(long = "from")]
        from: Option<String>,

        #[arg(long = "to")]
        to: Option<String>,
    },

    /// List a scholar's absences
    Absences {
        #[arg(long = "scholar")]
        scholar: String,
    },

    /// Run the daily sweep (loop by default)
    Sweep {
        #[arg(long = "once", help = "Sweep yesterday once and exit")]
        once: bool,

        #[arg(long = "now", help = "Override the current time (YYYY-MM-DD HH:MM)")]
        now: Option<String>,
    },
}
