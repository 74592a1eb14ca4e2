mod config;
pub mod database;
mod kv;

pub use config::{BlockedApp, BlockingConfig, Config, NotificationsConfig, TimerConfig};
pub use database::{Database, SessionLog};
pub use kv::{KvStore, MemoryKv};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the data directory, creating it if needed.
///
/// `PAWMODORO_HOME` overrides the location outright. Otherwise this is
/// `~/.config/pawmodoro[-dev]/`, with PAWMODORO_ENV=dev selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("PAWMODORO_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("PAWMODORO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pawmodoro-dev")
            } else {
                base_dir.join("pawmodoro")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
