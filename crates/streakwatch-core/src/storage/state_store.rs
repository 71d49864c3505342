//! JSON persistence for [`StreakState`].
//!
//! The state lives in `streak.json` next to the config file. Writes go
//! through a temporary file and a rename so a crash never leaves a
//! half-written state behind.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::data_dir;
use crate::error::StorageError;
use crate::streak::StreakState;

pub const STATE_FILE: &str = "streak.json";

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store at the default location inside [`data_dir`].
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self {
            path: data_dir()?.join(STATE_FILE),
        })
    }

    /// Store backed by an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state, or the zero state if the file does not exist yet.
    ///
    /// # Errors
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<StreakState, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file, starting from zero");
                return Ok(StreakState::default());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut state: StreakState =
            serde_json::from_str(&content).map_err(|source| StorageError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if state.normalize() {
            warn!(path = %self.path.display(), "state file counters were inconsistent; repaired");
        }
        Ok(state)
    }

    /// Write the state synchronously.
    pub fn save(&self, state: &StreakState) -> Result<(), StorageError> {
        let write_err = |source: std::io::Error| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        let content = serde_json::to_string_pretty(state).map_err(|e| write_err(e.into()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;

        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}
