use clap::{Parser, Subcommand, ValueEnum};

/// A calendar-first task list with recurring tasks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task
    Add(AddCommand),
    /// Show tasks and recurring occurrences in a date range
    Agenda(AgendaCommand),
    /// Show the next occurrences of a recurring task
    Preview(PreviewCommand),
    /// Toggle completion of a task or occurrence
    Complete(CompleteCommand),
    /// Change the due date or notes of a task or occurrence
    Edit(EditCommand),
    /// Delete a stored task
    Delete(DeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the task
    pub title: String,
    /// Due date (YYYY-MM-DD, YYYY-MM-DD HH:MM, today, tomorrow)
    #[clap(short, long)]
    pub due: Option<String>,
    /// Markdown notes; makes the task a deep task
    #[clap(short, long)]
    pub content: Option<String>,
    /// Create a deep task even without notes
    #[clap(long)]
    pub deep: bool,
    /// Human-friendly recurrence frequency
    #[clap(long, value_enum, help = "Recurrence frequency (daily, weekly, monthly, yearly, weekdays, weekends)")]
    pub every: Option<RecurrenceShortcut>,
    /// Repeat every N days/weeks/months/years
    #[clap(long, requires = "every", default_value_t = 1)]
    pub interval: u32,
    /// Days of week for weekly recurrence
    #[clap(long, requires = "every", help = "Days of week (mon,tue,wed,thu,fri,sat,sun)")]
    pub on: Option<String>,
    /// End date for recurrence
    #[clap(long, requires = "every", help = "Last day of the recurrence (e.g., '2025-12-31')")]
    pub until: Option<String>,
    /// Maximum number of occurrences
    #[clap(long, requires = "every", help = "Maximum number of occurrences, the first one included")]
    pub count: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct AgendaCommand {
    /// First day to show (defaults to today)
    #[clap(long)]
    pub from: Option<String>,
    /// Last day to show (defaults to the configured agenda length)
    #[clap(long)]
    pub to: Option<String>,
    /// Print tasks as JSON instead of a table
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    /// ID (or unique prefix) of the recurring task
    pub id: String,
    /// First day to consider (defaults to today)
    #[clap(long)]
    pub from: Option<String>,
    /// Number of occurrences to show
    #[clap(short = 'n', long)]
    pub count: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompleteCommand {
    /// ID of a task or occurrence (unique prefixes are accepted)
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// ID of a task or occurrence (unique prefixes are accepted)
    pub id: String,

    #[arg(long)]
    pub due: Option<String>,

    #[arg(long)]
    pub content: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// ID of the stored task to delete
    pub id: String,
}

/// Human-friendly recurrence patterns
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceShortcut {
    /// Every day
    Daily,
    /// Every week (same day unless --on is given)
    Weekly,
    /// Every month (same date)
    Monthly,
    /// Every year (same date)
    Yearly,
    /// Monday to Friday
    Weekdays,
    /// Saturday and Sunday
    Weekends,
}

impl std::fmt::Display for RecurrenceShortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurrenceShortcut::Daily => write!(f, "daily"),
            RecurrenceShortcut::Weekly => write!(f, "weekly"),
            RecurrenceShortcut::Monthly => write!(f, "monthly"),
            RecurrenceShortcut::Yearly => write!(f, "yearly"),
            RecurrenceShortcut::Weekdays => write!(f, "weekdays"),
            RecurrenceShortcut::Weekends => write!(f, "weekends"),
        }
    }
}
