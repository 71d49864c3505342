use streakwatch_core::{Config, ReminderMode, StateStore};

use super::CliResult;

pub fn run(mode: Option<String>, streak: Option<u32>) -> CliResult {
    let config = Config::load()?;
    let mode = match mode {
        Some(raw) => raw.parse::<ReminderMode>()?,
        None => config.reminder_mode,
    };
    let streak = match streak {
        Some(n) => n,
        None => StateStore::open()?.load()?.current_streak,
    };

    let table = config.reminder_table_for(mode)?;
    println!("{}", table.message_for(streak));
    Ok(())
}
