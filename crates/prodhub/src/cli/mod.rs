//! CLI command definitions.

pub mod events;
pub mod journal;
pub mod notes;
pub mod notifications;
pub mod shares;
pub mod tasks;

use clap::{Parser, Subcommand, ValueEnum};

use prodhub_core::record::Record;
use prodhub_core::storage::StoreError;

use crate::config::{Config, StoreBackend};
use crate::context::AppContext;
use crate::error::Result;

/// Personal productivity hub: tasks, notes, journal, calendar and reminders.
#[derive(Debug, Parser)]
#[command(name = "prodhub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// User whose collections are read and written.
    #[arg(long, short, env = "PRODHUB_USER")]
    pub user: String,

    /// Document store backend (memory or sqlite).
    #[arg(long, env = "STORE_BACKEND")]
    pub store: Option<StoreBackend>,

    /// SQLite database path.
    #[arg(long, env = "SQLITE_PATH")]
    pub sqlite_path: Option<String>,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Only log warnings and errors.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(store) = self.store {
            config.store_backend = store;
        }
        if let Some(path) = &self.sqlite_path {
            config.sqlite_path = path.clone();
        }
        config
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Task management.
    Tasks(tasks::TasksCommand),
    /// Note management.
    Notes(notes::NotesCommand),
    /// Journal entries.
    Journal(journal::JournalCommand),
    /// Calendar events.
    Events(events::EventsCommand),
    /// Notifications and reminder preferences.
    Notifications(notifications::NotificationsCommand),
    /// Resource sharing.
    Shares(shares::SharesCommand),
    /// Run the reminder scheduler until interrupted.
    Run,
}

/// Executes a one-shot command and renders its result.
///
/// [`Commands::Run`] is long-running and handled by the binary; here it
/// renders nothing.
pub async fn execute(command: Commands, context: &AppContext, format: OutputFormat) -> Result<String> {
    match command {
        Commands::Tasks(cmd) => tasks::run(cmd, context, format).await,
        Commands::Notes(cmd) => notes::run(cmd, context, format).await,
        Commands::Journal(cmd) => journal::run(cmd, context, format).await,
        Commands::Events(cmd) => events::run(cmd, context, format).await,
        Commands::Notifications(cmd) => notifications::run(cmd, context, format).await,
        Commands::Shares(cmd) => shares::run(cmd, context, format).await,
        Commands::Run => Ok(String::new()),
    }
}

/// Cached record by id, or a not-found error.
fn found<T: Record>(record: Option<T>, id: &str) -> Result<T> {
    record.ok_or_else(|| StoreError::not_found(T::COLLECTION, id).into())
}
