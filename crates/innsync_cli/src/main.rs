//! Innsync CLI - command-line interface for the property mirror.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "innsync")]
#[command(version)]
#[command(about = "Local mirror of hotel property content")]
#[command(
    long_about = "Innsync maintains a local, queryable mirror of hotel property data \
sourced from an external content API. It periodically fetches property records, \
reviews and translations, persists only changed records, and exposes sync \
status and history."
)]
#[command(after_long_help = r#"EXAMPLES
    Apply migrations and run one sync pass:
        $ innsync migrate up
        $ innsync sync

    Sync a specific subset of properties:
        $ innsync sync --ids 1641879 317597

    Inspect the service:
        $ innsync status
        $ innsync logs --limit 5
        $ innsync settings get

CONFIGURATION
    Innsync reads configuration from:
      1. Environment variables (INNSYNC_* prefix)
      2. ./innsync.toml
      3. .env file in the current directory

ENVIRONMENT VARIABLES
    INNSYNC_DATABASE__URL          Database connection string
    INNSYNC_UPSTREAM__BASE_URL     Upstream content API base URL
    INNSYNC_UPSTREAM__VERSION      Upstream API version segment (default: v3)
    INNSYNC_UPSTREAM__API_KEY      Upstream API key
    INNSYNC_SYNC__INTERVAL         Scheduler period (default: 12h)
    INNSYNC_SYNC__BATCH_SIZE       Properties per persist batch (default: 10)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Run one synchronization pass now
    Sync {
        /// Property ids to sync (defaults to the full tracked set)
        #[arg(long, num_args = 1..)]
        ids: Option<Vec<i64>>,
    },
    /// Show sync status and health
    Status,
    /// Show recent sync run logs
    Logs {
        /// Number of logs to return
        #[arg(long, default_value_t = 10)]
        limit: u64,
        /// Number of logs to skip
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    /// Inspect or change sync settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the persisted sync settings
    Get,
    /// Update one setting
    Set {
        /// Setting key (e.g. sync_interval)
        key: String,
        /// New value (e.g. 24h)
        value: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "innsync=info".into()))
        .init();

    let cli = Cli::parse();
    let config = innsync::AppConfig::load()?;

    match cli.command {
        Commands::Migrate { action } => commands::migrate::handle_migrate(action, &config).await,
        Commands::Sync { ids } => commands::sync::handle_sync(ids, &config).await,
        Commands::Status => commands::status::handle_status(&config).await,
        Commands::Logs { limit, offset } => commands::logs::handle_logs(limit, offset, &config).await,
        Commands::Settings { action } => commands::settings::handle_settings(action, &config).await,
    }
}
