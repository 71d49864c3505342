use clap::Subcommand;
use streakwatch_core::activity::github::resolve_token;
use streakwatch_core::activity::keyring_store;
use streakwatch_core::{Config, GitHubActivitySource};

use super::CliResult;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Verify a personal access token and store it in the OS keyring
    Login {
        /// GitHub personal access token
        #[arg(long)]
        token: String,
        /// Skip the API round-trip that validates the token
        #[arg(long)]
        no_verify: bool,
    },
    /// Remove the stored token
    Logout,
    /// Check authentication status
    Status,
}

pub async fn run(action: AuthAction) -> CliResult {
    match action {
        AuthAction::Login { token, no_verify } => {
            let mut config = Config::load()?;
            if !no_verify {
                let probe = GitHubActivitySource::new(
                    config.username.trim(),
                    Some(token.clone()),
                    config.github.day_zone,
                    std::time::Duration::from_secs(config.github.request_timeout_secs),
                )?
                .with_base_url(&config.github.api_base_url)?;
                let login = probe.verify().await?;
                println!("GitHub authenticated as {login}");
                if config.username.trim().is_empty() {
                    config.username = login;
                    config.save()?;
                }
            }
            keyring_store::set(keyring_store::GITHUB_TOKEN, &token)?;
            println!("token stored");
        }
        AuthAction::Logout => {
            keyring_store::delete(keyring_store::GITHUB_TOKEN)?;
            println!("GitHub disconnected");
        }
        AuthAction::Status => {
            let config = Config::load()?;
            let where_from = if !config.token.is_empty() {
                Some("config file")
            } else if resolve_token(&config).is_some() {
                Some("OS keyring")
            } else {
                None
            };
            match where_from {
                Some(origin) => println!("authenticated (token from {origin})"),
                None => println!("not authenticated"),
            }
        }
    }
    Ok(())
}
