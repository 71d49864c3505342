//! Activity polling: did the user do anything that counts today?

pub mod github;

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;

pub use github::{GitHubActivitySource, QUALIFYING_EVENT_TYPES};

/// Outcome of one activity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityResult {
    /// At least one qualifying event today.
    Active,
    /// The feed was read and nothing qualifying happened today.
    Inactive,
    /// The check itself failed (network, auth, bad response).
    Unknown,
}

impl ActivityResult {
    pub fn from_found(found: bool) -> Self {
        if found {
            ActivityResult::Active
        } else {
            ActivityResult::Inactive
        }
    }
}

/// Anything that can answer "was there qualifying activity on `today`".
///
/// Implementations must map every failure to [`ActivityResult::Unknown`];
/// the caller never sees an error from this seam.
pub trait ActivitySource: Send + Sync {
    fn check_activity(&self, today: NaiveDate) -> impl Future<Output = ActivityResult> + Send;
}

impl<T: ActivitySource> ActivitySource for Arc<T> {
    fn check_activity(&self, today: NaiveDate) -> impl Future<Output = ActivityResult> + Send {
        (**self).check_activity(today)
    }
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    const SERVICE: &str = "streakwatch";

    /// Keyring entry holding the GitHub personal access token.
    pub const GITHUB_TOKEN: &str = "github_token";

    pub fn get(key: &str) -> Result<Option<String>, keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)
    }

    pub fn delete(key: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
