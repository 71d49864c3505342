pub mod config;
pub mod state_store;

pub use config::{Config, GitHubConfig, RemindersConfig, ScheduleConfig};
pub use state_store::StateStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the directory holding `config.toml` and `streak.json`.
///
/// `STREAKWATCH_HOME` wins if set. Otherwise `~/.config/streakwatch[-dev]/`,
/// with the `-dev` suffix selected by `STREAKWATCH_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("STREAKWATCH_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STREAKWATCH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("streakwatch-dev")
            } else {
                base_dir.join("streakwatch")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
