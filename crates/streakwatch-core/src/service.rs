//! The check flow shared by the scheduler and the manual `check` command.
//!
//! [`StreakService`] owns the only in-memory [`StreakState`]. Every check
//! holds the state lock from the network call through persistence, so two
//! checks can never interleave partial updates.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::activity::{ActivityResult, ActivitySource};
use crate::clock::Clock;
use crate::error::StorageError;
use crate::reminder::{celebration_message, ReminderTable};
use crate::storage::StateStore;
use crate::streak::{evaluate, Outcome, StreakState};

/// What a single check found, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckReport {
    /// Today was already recorded; the network was not contacted.
    AlreadySafe { streak: u32 },
    /// Qualifying activity found today.
    Active {
        streak: u32,
        outcome: Outcome,
        message: String,
    },
    /// Nothing yet today.
    Inactive {
        streak: u32,
        outcome: Outcome,
        reminder: String,
    },
    /// The activity check failed; state untouched.
    ConnectionError,
}

impl CheckReport {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        match self {
            CheckReport::AlreadySafe { streak } => {
                format!("Already committed today! Streak safe at {streak} days")
            }
            CheckReport::Active { message, .. } => message.clone(),
            CheckReport::Inactive { reminder, .. } => format!("No activity today - {reminder}"),
            CheckReport::ConnectionError => "Connection error: could not check GitHub".to_string(),
        }
    }
}

pub struct StreakService<S> {
    source: S,
    store: StateStore,
    state: Mutex<StreakState>,
    reminders: ReminderTable,
    clock: Arc<dyn Clock>,
}

impl<S: ActivitySource> StreakService<S> {
    /// Load the persisted state and wire up the collaborators.
    pub fn new(
        source: S,
        store: StateStore,
        reminders: ReminderTable,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StorageError> {
        let state = store.load()?;
        Ok(Self {
            source,
            store,
            state: Mutex::new(state),
            reminders,
            clock,
        })
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> StreakState {
        self.state.lock().await.clone()
    }

    /// Run one check and apply it to the streak.
    ///
    /// # Errors
    /// Returns [`StorageError`] if a changed state could not be written; the
    /// in-memory state then stays at the last persisted value.
    pub async fn check_now(&self) -> Result<CheckReport, StorageError> {
        let mut state = self.state.lock().await;

        let today = self.clock.today();
        let yesterday = today.pred_opt().unwrap_or(today);

        if state.is_active_on(today) {
            info!(streak = state.current_streak, "already committed today");
            return Ok(CheckReport::AlreadySafe {
                streak: state.current_streak,
            });
        }

        let activity = self.source.check_activity(today).await;
        if activity == ActivityResult::Unknown {
            warn!("could not check GitHub; streak left as is");
            return Ok(CheckReport::ConnectionError);
        }

        let eval = evaluate(&state, activity, today, yesterday);
        if eval.changed {
            self.store.save(&eval.state)?;
            *state = eval.state;
        }

        let streak = state.current_streak;
        info!(?activity, outcome = ?eval.outcome, streak, "streak evaluated");

        Ok(match activity {
            ActivityResult::Active => CheckReport::Active {
                streak,
                outcome: eval.outcome,
                message: celebration_message(streak),
            },
            _ => CheckReport::Inactive {
                streak,
                outcome: eval.outcome,
                reminder: self.reminders.message_for(streak).to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::reminder::ReminderMode;
    use crate::storage::state_store::STATE_FILE;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Scripted activity source that counts how often it was asked.
    struct Scripted {
        result: std::sync::Mutex<ActivityResult>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(result: ActivityResult) -> Self {
            Self {
                result: std::sync::Mutex::new(result),
                calls: AtomicUsize::new(0),
            }
        }

        fn set(&self, result: ActivityResult) {
            *self.result.lock().unwrap() = result;
        }
    }

    impl ActivitySource for Scripted {
        async fn check_activity(&self, _today: NaiveDate) -> ActivityResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.result.lock().unwrap()
        }
    }

    fn at(date: &str, hour: u32) -> NaiveDateTime {
        date.parse::<NaiveDate>()
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn service(
        dir: &TempDir,
        source: Arc<Scripted>,
        clock: Arc<FixedClock>,
    ) -> StreakService<Arc<Scripted>> {
        StreakService::new(
            source,
            StateStore::with_path(dir.path().join(STATE_FILE)),
            ReminderTable::builtin(ReminderMode::Strict),
            clock,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn active_check_persists_streak() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(Scripted::new(ActivityResult::Active));
        let clock = Arc::new(FixedClock::new(at("2024-01-01", 9)));
        let svc = service(&dir, source, clock);

        let report = svc.check_now().await.unwrap();
        assert_eq!(
            report,
            CheckReport::Active {
                streak: 1,
                outcome: Outcome::Started,
                message: "Activity detected! 1 day".into(),
            }
        );

        let on_disk = StateStore::with_path(dir.path().join(STATE_FILE))
            .load()
            .unwrap();
        assert_eq!(on_disk.current_streak, 1);
        assert_eq!(on_disk, svc.snapshot().await);
    }

    #[tokio::test]
    async fn recorded_day_skips_network() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(Scripted::new(ActivityResult::Active));
        let clock = Arc::new(FixedClock::new(at("2024-01-01", 9)));
        let svc = service(&dir, source.clone(), clock);

        svc.check_now().await.unwrap();
        let report = svc.check_now().await.unwrap();

        assert_eq!(report, CheckReport::AlreadySafe { streak: 1 });
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn streak_grows_across_days_and_resets_after_gap() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(Scripted::new(ActivityResult::Active));
        let clock = Arc::new(FixedClock::new(at("2024-01-01", 9)));
        let svc = service(&dir, source.clone(), clock.clone());

        svc.check_now().await.unwrap();
        clock.set(at("2024-01-02", 9));
        svc.check_now().await.unwrap();
        assert_eq!(svc.snapshot().await.current_streak, 2);

        // one-day gap: grace
        source.set(ActivityResult::Inactive);
        clock.set(at("2024-01-03", 20));
        let report = svc.check_now().await.unwrap();
        assert!(matches!(
            report,
            CheckReport::Inactive {
                streak: 2,
                outcome: Outcome::Grace,
                ..
            }
        ));

        // two-day gap: reset
        clock.set(at("2024-01-04", 9));
        let report = svc.check_now().await.unwrap();
        assert_eq!(
            report,
            CheckReport::Inactive {
                streak: 0,
                outcome: Outcome::Reset,
                reminder: "Your streak is DEAD. Get coding NOW.".into(),
            }
        );
        let state = svc.snapshot().await;
        assert_eq!(state.longest_streak, 2);
        assert_eq!(state.total_days, 2);
    }

    #[tokio::test]
    async fn unknown_leaves_state_and_file_alone() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(Scripted::new(ActivityResult::Unknown));
        let clock = Arc::new(FixedClock::new(at("2024-01-05", 9)));
        let svc = service(&dir, source, clock);

        let report = svc.check_now().await.unwrap();
        assert_eq!(report, CheckReport::ConnectionError);
        assert_eq!(svc.snapshot().await, StreakState::default());
        assert!(!dir.path().join(STATE_FILE).exists());
    }

    #[tokio::test]
    async fn storage_failure_is_reported_and_state_kept() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(Scripted::new(ActivityResult::Active));
        let clock = Arc::new(FixedClock::new(at("2024-01-05", 9)));
        let svc = service(&dir, source, clock.clone());

        svc.check_now().await.unwrap();
        let saved = svc.snapshot().await;
        assert_eq!(saved.current_streak, 1);

        // a directory in place of the state file makes the rename fail
        let state_path = dir.path().join(STATE_FILE);
        std::fs::remove_file(&state_path).unwrap();
        std::fs::create_dir(&state_path).unwrap();

        clock.set(at("2024-01-06", 9));
        let err = svc.check_now().await.unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
        assert_eq!(svc.snapshot().await, saved);
    }

    #[tokio::test]
    async fn concurrent_checks_count_the_day_once() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(Scripted::new(ActivityResult::Active));
        let clock = Arc::new(FixedClock::new(at("2024-01-05", 9)));
        let svc = Arc::new(service(&dir, source.clone(), clock));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.check_now().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let state = svc.snapshot().await;
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.total_days, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn report_json_is_tagged_with_snake_case_outcome() {
        let report = CheckReport::Active {
            streak: 2,
            outcome: Outcome::Extended,
            message: celebration_message(2),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["outcome"], "extended");
        assert_eq!(json["message"], "Activity detected! 2 days");
    }

    #[test]
    fn summaries_are_human_readable() {
        assert_eq!(
            CheckReport::AlreadySafe { streak: 3 }.summary(),
            "Already committed today! Streak safe at 3 days"
        );
        assert!(CheckReport::ConnectionError.summary().contains("Connection error"));
    }
}
