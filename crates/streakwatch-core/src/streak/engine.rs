//! Streak state machine.
//!
//! Pure date arithmetic over [`StreakState`]: no clock, no I/O. The caller
//! supplies `today` and `yesterday` and persists the result when
//! [`Evaluation::changed`] is set.

use chrono::NaiveDate;
use serde::Serialize;

use super::StreakState;
use crate::activity::ActivityResult;

/// Which branch of the state machine an evaluation took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Activity today continued yesterday's streak.
    Extended,
    /// Activity today began a new streak at 1.
    Started,
    /// Today was already counted; nothing moved.
    AlreadyCounted,
    /// No activity yet today, but yesterday was active.
    Grace,
    /// No activity and the last active day is two or more days back.
    Reset,
    /// Inactive report for a day already recorded as active.
    AlreadyActive,
    /// The activity check failed.
    Unknown,
}

/// Result of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub state: StreakState,
    /// `true` when `state` must be persisted.
    pub changed: bool,
    pub outcome: Outcome,
}

impl Evaluation {
    fn unchanged(state: &StreakState, outcome: Outcome) -> Self {
        Self {
            state: state.clone(),
            changed: false,
            outcome,
        }
    }
}

/// Compute the next streak state from one activity check.
///
/// A day is counted at most once. A one-day gap keeps the streak alive
/// (today is not over yet); only a gap of two or more days resets it.
pub fn evaluate(
    state: &StreakState,
    activity: ActivityResult,
    today: NaiveDate,
    yesterday: NaiveDate,
) -> Evaluation {
    match activity {
        ActivityResult::Unknown => Evaluation::unchanged(state, Outcome::Unknown),
        ActivityResult::Active => record_active(state, today, yesterday),
        ActivityResult::Inactive => record_inactive(state, today, yesterday),
    }
}

fn record_active(state: &StreakState, today: NaiveDate, yesterday: NaiveDate) -> Evaluation {
    let mut next = state.clone();
    next.commit_history.insert(today, true);

    let outcome = match state.last_commit_date {
        Some(last) if last == today => Outcome::AlreadyCounted,
        Some(last) if last == yesterday => {
            next.current_streak = next.current_streak.saturating_add(1);
            Outcome::Extended
        }
        _ => {
            next.current_streak = 1;
            Outcome::Started
        }
    };

    next.last_commit_date = Some(today);
    next.longest_streak = next.longest_streak.max(next.current_streak);
    next.total_days = next.history_len();

    Evaluation {
        state: next,
        changed: true,
        outcome,
    }
}

fn record_inactive(state: &StreakState, today: NaiveDate, yesterday: NaiveDate) -> Evaluation {
    match state.last_commit_date {
        Some(last) if last == yesterday => Evaluation::unchanged(state, Outcome::Grace),
        Some(last) if last == today => Evaluation::unchanged(state, Outcome::AlreadyActive),
        _ => {
            let mut next = state.clone();
            next.current_streak = 0;
            Evaluation {
                state: next,
                changed: true,
                outcome: Outcome::Reset,
            }
        }
    }
}
