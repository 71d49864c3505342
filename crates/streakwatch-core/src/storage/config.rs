//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - GitHub username and (optionally) access token
//! - Reminder tone and custom reminder tables
//! - Check schedule (slot times, wake interval, catch-up window)
//! - GitHub API endpoint and request timeout
//!
//! Configuration is stored at `~/.config/streakwatch/config.toml`.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::activity::github::DEFAULT_API_BASE;
use crate::clock::DayZone;
use crate::error::ConfigError;
use crate::reminder::{ReminderEntry, ReminderMode, ReminderTable};

pub const CONFIG_FILE: &str = "config.toml";

/// Check schedule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Times of day (`HH:MM`) at which a check runs.
    #[serde(default = "default_check_times")]
    pub check_times: Vec<String>,
    #[serde(default = "default_wake_interval_secs")]
    pub wake_interval_secs: u64,
    /// How long after a slot time the slot may still fire.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u32,
    #[serde(default = "default_true")]
    pub check_on_start: bool,
}

/// GitHub API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Zone used to date events, to decide what "today" is and to read
    /// `schedule.check_times`.
    #[serde(default)]
    pub day_zone: DayZone,
}

/// User-supplied reminder tables; empty means "use the built-in table".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default)]
    pub normal: Vec<ReminderEntry>,
    #[serde(default)]
    pub strict: Vec<ReminderEntry>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/streakwatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub username: String,
    /// Personal access token. Empty means "look in the OS keyring".
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub reminder_mode: ReminderMode,
    /// Start watching when launched without a subcommand.
    #[serde(default = "default_true")]
    pub auto_start: bool,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
}

// Default functions
fn default_check_times() -> Vec<String> {
    vec!["09:00".into(), "14:00".into(), "20:00".into()]
}
fn default_wake_interval_secs() -> u64 {
    30
}
fn default_window_minutes() -> u32 {
    10
}
fn default_api_base_url() -> String {
    DEFAULT_API_BASE.into()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_true() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            check_times: default_check_times(),
            wake_interval_secs: default_wake_interval_secs(),
            window_minutes: default_window_minutes(),
            check_on_start: true,
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            day_zone: DayZone::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            token: String::new(),
            reminder_mode: ReminderMode::default(),
            auto_start: true,
            schedule: ScheduleConfig::default(),
            github: GitHubConfig::default(),
            reminders: RemindersConfig::default(),
        }
    }
}

impl ScheduleConfig {
    /// Slot times parse, and the loop wakes at least once inside every
    /// slot window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.slots()?;
        if self.wake_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "schedule.wake_interval_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.window_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "schedule.window_minutes".into(),
                message: "must be at least 1".into(),
            });
        }
        let window_secs = u64::from(self.window_minutes) * 60;
        if self.wake_interval_secs >= window_secs {
            return Err(ConfigError::InvalidValue {
                key: "schedule.wake_interval_secs".into(),
                message: format!(
                    "{}s would skip slots; must be shorter than the {window_secs}s window",
                    self.wake_interval_secs
                ),
            });
        }
        Ok(())
    }

    /// Parsed slot times, sorted.
    pub fn slots(&self) -> Result<Vec<NaiveTime>, ConfigError> {
        let mut slots = self
            .check_times
            .iter()
            .map(|raw| {
                NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| {
                    ConfigError::InvalidValue {
                        key: "schedule.check_times".into(),
                        message: format!("'{raw}' is not HH:MM ({e})"),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        slots.sort();
        slots.dedup();
        Ok(slots)
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
        if key.is_empty() {
            return Err(ConfigError::MissingKey("config key is empty".into()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Array(_) if !value.trim_start().starts_with('[') => {
                        // comma list shorthand: `09:00,14:00`
                        serde_json::Value::Array(
                            value
                                .split(',')
                                .map(|s| serde_json::Value::String(s.trim().to_string()))
                                .collect(),
                        )
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join(CONFIG_FILE))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from(CONFIG_FILE),
                message: e.to_string(),
            })
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit file, writing defaults there if it is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_err = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_err(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_err(e.to_string()))
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

    /// Set a config value by key without saving. Returns error if the key is
    /// unknown or the resulting config is invalid.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Structural checks that do not depend on the user being set up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.schedule.validate()?;
        if self.github.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "github.request_timeout_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        self.reminder_table_for(ReminderMode::Normal)?;
        self.reminder_table_for(ReminderMode::Strict)?;
        Ok(())
    }

    /// Username, or an error telling the user to set it.
    pub fn require_username(&self) -> Result<&str, ConfigError> {
        let name = self.username.trim();
        if name.is_empty() {
            Err(ConfigError::MissingKey("username".into()))
        } else {
            Ok(name)
        }
    }

    /// Reminder table for the configured mode.
    pub fn reminder_table(&self) -> Result<ReminderTable, ConfigError> {
        self.reminder_table_for(self.reminder_mode)
    }

    pub fn reminder_table_for(&self, mode: ReminderMode) -> Result<ReminderTable, ConfigError> {
        let custom = match mode {
            ReminderMode::Normal => &self.reminders.normal,
            ReminderMode::Strict => &self.reminders.strict,
        };
        if custom.is_empty() {
            Ok(ReminderTable::builtin(mode))
        } else {
            ReminderTable::from_entries(custom)
        }
    }
}
