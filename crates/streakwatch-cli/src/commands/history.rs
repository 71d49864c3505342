use streakwatch_core::StateStore;

use super::CliResult;

pub fn run(limit: Option<usize>, json: bool) -> CliResult {
    let state = StateStore::open()?.load()?;
    let days: Vec<String> = state
        .active_days()
        .take(limit.unwrap_or(usize::MAX))
        .map(|d| d.to_string())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&days)?);
    } else if days.is_empty() {
        println!("No activity recorded yet");
    } else {
        for day in days {
            println!("{day}");
        }
    }
    Ok(())
}
