use crate::core::aggregator::{GroupBy, MAX_WEEKS, Order};
use crate::export::ExportFormat;
use clap::{Parser, Subcommand, ValueEnum};

/// Command-line interface definition for sitehours
/// Weekly hours for construction staffing, backed by SQLite
#[derive(Parser)]
#[command(
    name = "sitehours",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track shifts on job sites and report weekly hours, weekend hours and overtime",
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
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage worker profiles
    Worker {
        #[command(subcommand)]
        action: WorkerCmd,
    },

    /// Manage workplaces (job sites)
    Site {
        #[command(subcommand)]
        action: SiteCmd,
    },

    /// Register, list or delete time entries
    Entry {
        #[command(subcommand)]
        action: EntryCmd,
    },

    /// Weekly, overview, calendar and day reports
    Report {
        #[command(subcommand)]
        action: ReportCmd,
    },

    /// Write the weekly PDF timesheet of one worker on one site
    Timesheet {
        #[arg(long)]
        site: i64,

        #[arg(long)]
        worker: String,

        /// ISO week, e.g. 2025W42
        #[arg(long)]
        week: String,

        /// Output file (default: "<full name> - <week>.pdf" in the current directory)
        #[arg(long)]
        file: Option<String>,

        #[arg(long, help = "Overwrite an existing file without asking")]
        force: bool,
    },

    /// Export weekly hours to CSV, JSON, XLSX or PDF
    Export {
        #[arg(long, value_enum)]
        format: ExportFormat,

        /// Absolute path of the output file
        #[arg(long)]
        file: String,

        #[arg(long, conflicts_with = "site")]
        worker: Option<String>,

        #[arg(long)]
        site: Option<i64>,

        #[arg(long, value_enum, default_value_t = GroupBy::None)]
        by: GroupBy,

        #[arg(
            long,
            help = "Filter by year/month/day or a custom range (YYYY, YYYY-MM, YYYY-MM-DD, or ranges like YYYY-MM:YYYY-MM)"
        )]
        range: Option<String>,

        #[arg(long, help = "Overwrite an existing file without asking")]
        force: bool,
    },

    /// Manage stored documents
    Doc {
        #[command(subcommand)]
        action: DocCmd,
    },

    /// Follow profile status changes and recompute the current week
    Watch {
        /// Seconds between polls (1 to 86400)
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..=86_400))]
        interval: u64,

        /// Poll once against the baseline and exit
        #[arg(long)]
        once: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Create a backup copy of the database
    Backup {
        /// Absolute destination path
        #[arg(long)]
        file: String,

        #[arg(long, help = "Compress the backup (zip on Windows, tar.gz elsewhere)")]
        compress: bool,

        #[arg(long, help = "Overwrite an existing file without asking")]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum WorkerCmd {
    /// Register a worker (status: under_review)
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        last: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Set a worker's review status
    Status {
        id: String,
        /// approved | rejected | under_review
        status: String,
    },
    /// List workers
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Link an approved worker to an active workplace
    Join {
        id: String,
        #[arg(long)]
        site: i64,
    },
    /// Remove a worker from a workplace (recorded shifts are kept)
    Leave {
        id: String,
        #[arg(long)]
        site: i64,
    },
    /// Change profile fields, e.g. --field phone_number=+4512345678 (empty value clears)
    Edit {
        id: String,
        #[arg(long = "field", value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },
    /// Delete a worker profile and its workplace links
    Del {
        id: String,
        /// Also delete the worker's recorded shifts
        #[arg(long)]
        with_entries: bool,
    },
}

#[derive(Subcommand)]
pub enum SiteCmd {
    /// Create a workplace
    Add {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        details: SiteDetails,
    },
    /// List workplaces
    List {
        /// Include inactive workplaces
        #[arg(long)]
        all: bool,
        /// Only workplaces the worker belongs to
        #[arg(long)]
        worker: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Switch a workplace on or off
    Active {
        id: i64,
        #[arg(value_enum)]
        state: Switch,
    },
    /// Change workplace fields (an empty value clears an optional field)
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        details: SiteDetails,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SiteDetails {
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long = "site-number")]
    pub site_number: Option<String>,
    #[arg(long = "project-number")]
    pub project_number: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Subcommand)]
pub enum EntryCmd {
    /// Register a shift (local date and times in the configured time zone)
    Add {
        #[arg(long)]
        worker: String,
        #[arg(long)]
        site: i64,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        start: String,
        /// HH:MM
        #[arg(long)]
        end: String,
        /// Break in minutes
        #[arg(long = "break", default_value_t = 0, allow_negative_numbers = true)]
        break_minutes: i64,
        #[arg(long)]
        notes: Option<String>,
        /// Keep existing entries of the same worker, site and day
        #[arg(long)]
        append: bool,
    },
    /// List shifts of a worker or a site
    List {
        #[arg(long, required_unless_present = "site")]
        worker: Option<String>,
        #[arg(long, conflicts_with = "worker")]
        site: Option<i64>,
        #[arg(long, help = "YYYY, YYYY-MM, YYYY-MM-DD or a:b")]
        range: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Delete a shift by id
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum ReportCmd {
    /// Weekly totals, weekend hours and overtime tiers
    Weekly {
        #[arg(long, conflicts_with = "site")]
        worker: Option<String>,
        #[arg(long)]
        site: Option<i64>,
        #[arg(long, value_enum, default_value_t = GroupBy::None)]
        by: GroupBy,
        /// Number of weeks ending with the current week (1-520)
        #[arg(
            long,
            conflicts_with_all = ["from", "to"],
            value_parser = clap::value_parser!(u32).range(1..=MAX_WEEKS as i64)
        )]
        weeks: Option<u32>,
        /// First day (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,
        #[arg(long, value_enum, default_value_t = Order::NewestFirst)]
        order: Order,
        #[arg(long)]
        json: bool,
    },
    /// Per-worker and per-site weekly tables
    Overview {
        /// Number of weeks ending with the current week (1-520)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_WEEKS as i64))]
        weeks: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Worked hours per day of a month at a site
    Calendar {
        #[arg(long)]
        site: i64,
        /// YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Per-worker hours on one day at a site
    Day {
        #[arg(long)]
        site: i64,
        #[arg(long)]
        date: String,
        #[arg(long)]
        json: bool,
    },
    /// Workers with hours at a site in one ISO week
    WeekWorkers {
        #[arg(long)]
        site: i64,
        /// ISO week, e.g. 2025W42
        #[arg(long)]
        week: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum DocCmd {
    /// Store a file in the document library
    Add {
        #[arg(long)]
        file: String,
        /// Contract, Payslip, Invoice, Policy, Procedure, Template, Report, Other
        #[arg(long = "type")]
        doc_type: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List documents, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Copy a stored document out of the library
    Get {
        id: i64,
        /// Destination (default: the stored file name in the current directory)
        #[arg(long)]
        out: Option<String>,
    },
    /// Delete a document and its file
    Del { id: i64 },
}
