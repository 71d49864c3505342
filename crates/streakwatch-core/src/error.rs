//! Core error types for streakwatch-core.
//!
//! One error enum per concern, defined with thiserror. Connectivity
//! problems while polling GitHub are not part of the
//! streak-update path: they collapse into [`crate::ActivityResult::Unknown`]
//! at the poller boundary and only surface as [`ActivityError`] from
//! explicit token verification.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reading or writing the persisted streak state.
#[derive(Error, Debug)]
pub enum StorageError {
    /// State file exists but could not be read
    #[error("Failed to read state from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file could not be written
    #[error("Failed to write state to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file is not valid JSON for the streak model
    #[error("Failed to parse state file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration schema
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),
}

/// GitHub API errors.
#[derive(Error, Debug)]
pub enum ActivityError {
    /// Transport-level failure (DNS, TLS, timeout, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("GitHub API error: HTTP {status}")]
    Status { status: u16 },

    /// Response body did not match the expected shape
    #[error("Unexpected GitHub response: {0}")]
    Decode(String),

    /// Base URL in configuration is not usable
    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}
