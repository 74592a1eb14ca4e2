//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Work, break and cycle defaults
//! - Notification preferences
//! - The app-block list
//!
//! Configuration is stored at `<data dir>/config.toml`. A missing or
//! unreadable file yields defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::{SettingsProvider, MAX_BREAK_MINUTES};

/// Timer defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub default_work_minutes: u32,
    /// Minutes; `0` disables breaks. Clamped to `0..=60` when read.
    #[serde(default = "default_short_break")]
    pub short_break_length: u32,
    #[serde(default = "default_long_break")]
    pub long_break_length: u32,
    #[serde(default = "default_cycles")]
    pub default_cycles: u32,
    #[serde(default)]
    pub auto_start_next: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub vibration_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedApp {
    pub name: String,
    pub package: String,
    #[serde(default)]
    pub blocked: bool,
}

/// Apps to block during work phases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub apps: Vec<BlockedApp>,
}

impl BlockingConfig {
    pub fn has_blocked_apps(&self) -> bool {
        self.enabled && self.apps.iter().any(|a| a.blocked)
    }

    pub fn blocked(&self) -> impl Iterator<Item = &BlockedApp> {
        self.apps.iter().filter(|a| a.blocked)
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub blocking: BlockingConfig,
}

fn default_work_minutes() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_cycles() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_work_minutes: default_work_minutes(),
            short_break_length: default_short_break(),
            long_break_length: default_long_break(),
            default_cycles: default_cycles(),
            auto_start_next: false,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            notifications: NotificationsConfig::default(),
            blocking: BlockingConfig::default(),
        }
    }
}

impl SettingsProvider for Config {
    fn break_length_minutes(&self) -> u32 {
        self.timer.short_break_length.min(MAX_BREAK_MINUTES)
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// `config.toml` inside the data directory.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, returning defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        match Self::path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                warn!(error = %e, "config directory unavailable; using defaults");
                Self::default()
            }
        }
    }

    /// Load from an explicit path, returning defaults on any failure.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        toml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "unparseable config; using defaults");
            Self::default()
        })
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value does not parse
    /// as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Work length to use when none is given, never below one minute.
    pub fn work_minutes(&self) -> u32 {
        self.timer.default_work_minutes.max(1)
    }

    pub fn cycles(&self) -> u32 {
        self.timer.default_cycles.max(1)
    }
}
