use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted streak counters and the record of active days.
///
/// Serialized as the JSON object stored in `streak.json`. Dates are ISO 8601
/// (`YYYY-MM-DD`), both as `last_commit_date` and as `commit_history` keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive active days ending at `last_commit_date`.
    #[serde(default)]
    pub current_streak: u32,
    /// Largest `current_streak` ever observed.
    #[serde(default)]
    pub longest_streak: u32,
    /// Most recent day with qualifying activity.
    #[serde(default)]
    pub last_commit_date: Option<NaiveDate>,
    /// Number of distinct active days; mirrors `commit_history.len()`.
    #[serde(default)]
    pub total_days: u32,
    #[serde(default)]
    pub commit_history: BTreeMap<NaiveDate, bool>,
}

impl StreakState {
    /// Whether `day` is already recorded as active.
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.commit_history.get(&day).copied().unwrap_or(false)
    }

    /// Active days, newest first.
    pub fn active_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.commit_history
            .iter()
            .rev()
            .filter(|(_, active)| **active)
            .map(|(day, _)| *day)
    }

    /// Repair counters of a state read from disk so the invariants hold.
    ///
    /// Returns `true` if anything had to be changed.
    pub fn normalize(&mut self) -> bool {
        let mut touched = false;

        let recorded = self.history_len();
        if self.total_days != recorded {
            self.total_days = recorded;
            touched = true;
        }
        if self.longest_streak < self.current_streak {
            self.longest_streak = self.current_streak;
            touched = true;
        }

        touched
    }

    pub(crate) fn history_len(&self) -> u32 {
        u32::try_from(self.commit_history.len()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn default_is_zero_state() {
        let state = StreakState::default();
        assert_eq!(state.current_streak, 0);
        assert_eq!(state.longest_streak, 0);
        assert_eq!(state.last_commit_date, None);
        assert_eq!(state.total_days, 0);
        assert!(state.commit_history.is_empty());
    }

    #[test]
    fn json_layout_uses_iso_dates() {
        let mut state = StreakState::default();
        state.commit_history.insert(day("2024-01-05"), true);
        state.last_commit_date = Some(day("2024-01-05"));
        state.current_streak = 1;
        state.longest_streak = 1;
        state.total_days = 1;

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["last_commit_date"], "2024-01-05");
        assert_eq!(json["commit_history"]["2024-01-05"], true);
        assert_eq!(json["total_days"], 1);
    }

    #[test]
    fn parses_file_written_with_null_last_date() {
        let raw = r#"{
            "current_streak": 0,
            "longest_streak": 0,
            "last_commit_date": null,
            "total_days": 0,
            "commit_history": {}
        }"#;
        let state: StreakState = serde_json::from_str(raw).unwrap();
        assert_eq!(state, StreakState::default());
    }

    #[test]
    fn normalize_repairs_counters() {
        let mut state = StreakState {
            current_streak: 4,
            longest_streak: 2,
            last_commit_date: Some(day("2024-03-02")),
            total_days: 9,
            commit_history: [(day("2024-03-01"), true), (day("2024-03-02"), true)]
                .into_iter()
                .collect(),
        };

        assert!(state.normalize());
        assert_eq!(state.total_days, 2);
        assert_eq!(state.longest_streak, 4);
        assert!(!state.normalize());
    }

    #[test]
    fn active_days_newest_first() {
        let mut state = StreakState::default();
        state.commit_history.insert(day("2024-01-01"), true);
        state.commit_history.insert(day("2024-01-03"), true);
        state.commit_history.insert(day("2024-01-02"), false);

        let days: Vec<_> = state.active_days().collect();
        assert_eq!(days, vec![day("2024-01-03"), day("2024-01-01")]);
        assert!(state.is_active_on(day("2024-01-01")));
        assert!(!state.is_active_on(day("2024-01-02")));
        assert!(!state.is_active_on(day("2024-01-04")));
    }
}
