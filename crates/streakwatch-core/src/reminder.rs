//! Reminder messages shown when no activity has been found yet today.
//!
//! A table maps streak thresholds to messages; lookup returns the message of
//! the largest threshold not exceeding the current streak. Every table has a
//! `0` entry so the lookup always succeeds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tone of the reminder messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMode {
    /// Friendly milestone messages.
    #[default]
    Normal,
    /// Blunt daily nagging.
    Strict,
}

impl ReminderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderMode::Normal => "normal",
            ReminderMode::Strict => "strict",
        }
    }
}

impl fmt::Display for ReminderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(ReminderMode::Normal),
            "strict" => Ok(ReminderMode::Strict),
            other => Err(ConfigError::InvalidValue {
                key: "reminder_mode".into(),
                message: format!("expected 'normal' or 'strict', got '{other}'"),
            }),
        }
    }
}

/// One `{threshold, message}` pair as written in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub threshold: u32,
    pub message: String,
}

const NORMAL_MESSAGES: &[(u32, &str)] = &[
    (0, "No commits yet today. A small one still counts!"),
    (1, "Day one is on the board. Come back and make it two."),
    (3, "Three days running. Keep the chain going today."),
    (7, "A full week! Don't let today be the gap."),
    (14, "Two weeks strong. The habit is forming."),
    (21, "Three weeks in. Consistency is becoming your thing."),
    (30, "A month of daily commits. Protect it today."),
    (50, "Fifty days! Your contribution graph thanks you."),
    (75, "75 days. This is who you are now."),
    (100, "Triple digits. One commit keeps it alive."),
    (150, "150 days. Don't let today be the one that breaks it."),
    (200, "200 days of showing up. Show up once more."),
    (250, "250 days. Legendary pace, keep it rolling."),
    (300, "300 days. The finish line of the year is in sight."),
    (365, "A whole year of commits. Extend the legend today."),
];

const STRICT_MESSAGES: &[(u32, &str)] = &[
    (0, "Your streak is DEAD. Get coding NOW."),
    (1, "1 day? That's nothing. Don't break it."),
    (2, "2 days. You're on thin ice."),
    (3, "3 days. One miss and it's over."),
    (4, "4 days. Don't you dare skip today."),
    (5, "5 days. One lazy day and it's gone."),
    (6, "6 days. The clock is ticking."),
    (7, "7 days. Stop procrastinating."),
    (10, "10 days. I'm still watching."),
    (14, "14 days. Hit the target again."),
    (21, "21 days. Don't lose direction now."),
    (30, "30 days. Don't fall into the gap."),
    (45, "45 days. Excuses are not commits."),
    (60, "60 days. Monumental. Now commit."),
    (90, "90 days. A quarter of a year. Today counts too."),
    (120, "120 days. Throwing it away today would be tragic."),
    (180, "180 days. Half a year. Don't you dare."),
    (240, "240 days. Still not done. Commit."),
    (300, "300 days. Sixty-five to go. No days off."),
    (364, "364 days. One brick remains."),
    (365, "365 days. Absolute victory. Now do it again."),
];

/// Threshold-keyed message table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTable {
    /// Sorted by threshold, unique thresholds, first entry is 0.
    entries: Vec<(u32, String)>,
}

impl ReminderTable {
    /// Built-in table for `mode`.
    pub fn builtin(mode: ReminderMode) -> Self {
        let raw = match mode {
            ReminderMode::Normal => NORMAL_MESSAGES,
            ReminderMode::Strict => STRICT_MESSAGES,
        };
        Self {
            entries: raw.iter().map(|(t, m)| (*t, (*m).to_string())).collect(),
        }
    }

    /// Build a table from user entries.
    ///
    /// Later entries win on duplicate thresholds. Fails if no entry has
    /// threshold `0`.
    pub fn from_entries(entries: &[ReminderEntry]) -> Result<Self, ConfigError> {
        let mut sorted: Vec<(u32, String)> = entries
            .iter()
            .map(|e| (e.threshold, e.message.clone()))
            .collect();
        sorted.sort_by_key(|(threshold, _)| *threshold);

        let mut deduped: Vec<(u32, String)> = Vec::with_capacity(sorted.len());
        for (threshold, message) in sorted {
            match deduped.last_mut() {
                Some(last) if last.0 == threshold => last.1 = message,
                _ => deduped.push((threshold, message)),
            }
        }

        if deduped.first().map(|(t, _)| *t) != Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "reminders".into(),
                message: "a reminder table needs a threshold 0 entry".into(),
            });
        }

        Ok(Self { entries: deduped })
    }

    /// Message for the largest threshold `<= streak`.
    pub fn message_for(&self, streak: u32) -> &str {
        let idx = self.entries.partition_point(|(threshold, _)| *threshold <= streak);
        // entries[0] is the 0 threshold, so idx >= 1
        &self.entries[idx.saturating_sub(1)].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reminder text for `current_streak` from the built-in table of `mode`.
pub fn reminder_message(current_streak: u32, mode: ReminderMode) -> String {
    ReminderTable::builtin(mode)
        .message_for(current_streak)
        .to_string()
}

/// Text announced when today's activity was detected.
pub fn celebration_message(current_streak: u32) -> String {
    match current_streak {
        1 => "Activity detected! 1 day".to_string(),
        n => format!("Activity detected! {n} days"),
    }
}
