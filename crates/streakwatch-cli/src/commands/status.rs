use serde::Serialize;
use streakwatch_core::{Config, StateStore, StreakState};

use super::CliResult;

#[derive(Serialize)]
struct StatusView<'a> {
    username: &'a str,
    current_streak: u32,
    longest_streak: u32,
    total_days: u32,
    last_commit_date: Option<String>,
}

impl<'a> StatusView<'a> {
    fn new(username: &'a str, state: &StreakState) -> Self {
        Self {
            username,
            current_streak: state.current_streak,
            longest_streak: state.longest_streak,
            total_days: state.total_days,
            last_commit_date: state.last_commit_date.map(|d| d.to_string()),
        }
    }
}

pub fn run(json: bool) -> CliResult {
    let config = Config::load()?;
    let state = StateStore::open()?.load()?;
    let view = StatusView::new(&config.username, &state);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let user = if view.username.is_empty() {
        "(not configured)"
    } else {
        view.username
    };
    println!("User:            {user}");
    println!("Current streak:  {} days", view.current_streak);
    println!("Longest streak:  {} days", view.longest_streak);
    println!("Total days:      {}", view.total_days);
    println!(
        "Last commit:     {}",
        view.last_commit_date.as_deref().unwrap_or("Never")
    );
    Ok(())
}
