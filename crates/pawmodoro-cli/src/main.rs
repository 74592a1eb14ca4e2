use chrono::Local;
use clap::{Parser, Subcommand};
use pawmodoro_core::Database;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pawmodoro", version, about = "Pawmodoro CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Unlocked collectibles and the companion
    Collection {
        #[command(subcommand)]
        action: commands::collection::CollectionAction,
    },
    /// Focus statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn log_app_open() {
    let result = Database::open().and_then(|db| db.log_app_open(Local::now().date_naive()));
    if let Err(e) = result {
        warn!(error = %e, "failed to record app open");
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    log_app_open();

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Collection { action } => commands::collection::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
