pub mod auth;
pub mod check;
pub mod config;
pub mod history;
pub mod reminder;
pub mod status;
pub mod watch;

use std::sync::Arc;

use streakwatch_core::{Config, GitHubActivitySource, StateStore, StreakService, SystemClock};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Bare `streakwatch`: watch if `auto_start` is set, else print status.
pub async fn default_action() -> CliResult {
    let config = Config::load()?;
    if config.auto_start {
        watch::run().await
    } else {
        status::run(false)
    }
}

/// Wire the configured GitHub source, state file and reminders together.
pub fn build_service(
    config: &Config,
) -> Result<StreakService<GitHubActivitySource>, Box<dyn std::error::Error>> {
    config.validate()?;
    config.require_username().map_err(|_| {
        "no GitHub username configured; run `streakwatch config set username <name>`"
    })?;

    let source = GitHubActivitySource::from_config(config)?;
    tracing::debug!(
        user = source.username(),
        authenticated = source.is_authenticated(),
        "GitHub source ready"
    );
    let service = StreakService::new(
        source,
        StateStore::open()?,
        config.reminder_table()?,
        Arc::new(SystemClock::new(config.github.day_zone)),
    )?;
    Ok(service)
}
