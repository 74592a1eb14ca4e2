use std::sync::Arc;

use chrono::Local;
use clap::Subcommand;
use pawmodoro_core::{Catalog, FocusStats};

use super::{open_collection, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Focus hours per day, totals and streak
    Summary {
        /// Number of days to include, ending today
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Print the raw session log as JSON
    Export,
    /// Clear the session and app-open logs
    Reset,
}

pub fn run(action: StatsAction) -> CliResult {
    let (db, collection) = open_collection(Arc::new(Catalog::builtin()))?;

    match action {
        StatsAction::Summary { days } => {
            let level = collection
                .companion_entry()
                .map(|e| e.progress.level)
                .unwrap_or(1);
            let stats =
                FocusStats::new(db.sessions()?, db.app_open_days()?).with_timezone(Local);
            let summary = stats.summary(days, Local::now().date_naive(), level);
            print_json(&summary)?;
        }
        StatsAction::Export => {
            print_json(&db.sessions()?)?;
        }
        StatsAction::Reset => {
            db.reset_stats()?;
            println!("stats reset");
        }
    }
    Ok(())
}
