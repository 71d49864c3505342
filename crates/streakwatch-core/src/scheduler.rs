//! Three-times-a-day check loop.
//!
//! The loop wakes every `wake_interval`, asks a [`SlotTracker`] whether a
//! configured slot is due and, if so, runs one [`StreakService::check_now`].
//! Each slot fires at most once per calendar day. Stopping is cooperative:
//! cancelling the token ends the loop at its next wake, never in the middle
//! of a check.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::activity::ActivitySource;
use crate::clock::Clock;
use crate::error::ConfigError;
use crate::service::{CheckReport, StreakService};
use crate::storage::ScheduleConfig;

/// When checks run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSchedule {
    pub slots: Vec<NaiveTime>,
    /// A slot stays due for this long after its time.
    pub window: chrono::Duration,
    pub wake_interval: Duration,
    pub check_on_start: bool,
}

impl CheckSchedule {
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            slots: config.slots()?,
            window: chrono::Duration::minutes(i64::from(config.window_minutes)),
            wake_interval: Duration::from_secs(config.wake_interval_secs),
            check_on_start: config.check_on_start,
        })
    }
}

/// Remembers which slots already fired on which day.
#[derive(Debug, Clone)]
pub struct SlotTracker {
    slots: Vec<NaiveTime>,
    window: chrono::Duration,
    fired: HashSet<(NaiveDate, NaiveTime)>,
}

impl SlotTracker {
    pub fn new(slots: Vec<NaiveTime>, window: chrono::Duration) -> Self {
        Self {
            slots,
            window,
            fired: HashSet::new(),
        }
    }

    /// The slot to run now, if any; marks it as fired.
    ///
    /// A slot is due when `slot <= now < slot + window` on the slot's own
    /// day (yesterday's late slots may spill past midnight).
    pub fn due(&mut self, now: NaiveDateTime) -> Option<NaiveTime> {
        let today = now.date();
        let yesterday = today.pred_opt();
        self.fired.retain(|(day, _)| *day >= yesterday.unwrap_or(today));

        let days = std::iter::once(today).chain(yesterday);
        for day in days {
            for &slot in &self.slots {
                let start = day.and_time(slot);
                if start <= now && now < start + self.window && self.fired.insert((day, slot)) {
                    return Some(slot);
                }
            }
        }
        None
    }
}

/// One check performed by the loop.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledReport {
    /// `None` for the check run at start-up.
    pub slot: Option<NaiveTime>,
    pub at: NaiveDateTime,
    /// Check result, or the storage error message.
    pub result: Result<CheckReport, String>,
}

pub struct Scheduler {
    schedule: CheckSchedule,
    clock: Arc<dyn Clock>,
}

impl Scheduler {
    pub fn new(schedule: CheckSchedule, clock: Arc<dyn Clock>) -> Self {
        Self { schedule, clock }
    }

    /// Executes the check loop until `shutdown` is cancelled.
    ///
    /// Every check result is forwarded on `reports`; a dropped receiver does
    /// not stop the loop.
    pub async fn run<S: ActivitySource>(
        self,
        service: Arc<StreakService<S>>,
        shutdown: CancellationToken,
        reports: mpsc::Sender<ScheduledReport>,
    ) {
        let mut tracker = SlotTracker::new(self.schedule.slots.clone(), self.schedule.window);
        info!(
            slots = ?self.schedule.slots,
            wake_secs = self.schedule.wake_interval.as_secs(),
            "monitoring started"
        );

        if self.schedule.check_on_start {
            self.run_check(&service, None, &reports).await;
        }

        let mut ticker = tokio::time::interval(self.schedule.wake_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => (),
            }

            let now = self.clock.now();
            match tracker.due(now) {
                Some(slot) => {
                    info!(%slot, "scheduled check due");
                    self.run_check(&service, Some(slot), &reports).await;
                }
                None => debug!(%now, "no slot due"),
            }
        }

        info!("monitoring stopped");
    }

    async fn run_check<S: ActivitySource>(
        &self,
        service: &StreakService<S>,
        slot: Option<NaiveTime>,
        reports: &mpsc::Sender<ScheduledReport>,
    ) {
        let result = match service.check_now().await {
            Ok(report) => Ok(report),
            Err(e) => {
                error!("failed to persist streak: {e}");
                Err(e.to_string())
            }
        };

        let report = ScheduledReport {
            slot,
            at: self.clock.now(),
            result,
        };
        if reports.send(report).await.is_err() {
            warn!("report receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityResult;
    use crate::clock::FixedClock;
    use crate::reminder::{ReminderMode, ReminderTable};
    use crate::storage::state_store::STATE_FILE;
    use crate::storage::StateStore;
    use tempfile::TempDir;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn at(date: &str, h: u32, m: u32) -> NaiveDateTime {
        date.parse::<NaiveDate>().unwrap().and_time(t(h, m))
    }

    fn tracker() -> SlotTracker {
        SlotTracker::new(vec![t(9, 0), t(14, 0), t(20, 0)], chrono::Duration::minutes(10))
    }

    #[test]
    fn slot_fires_once_per_day() {
        let mut tr = tracker();
        assert_eq!(tr.due(at("2024-01-06", 8, 59)), None);
        assert_eq!(tr.due(at("2024-01-06", 9, 0)), Some(t(9, 0)));
        assert_eq!(tr.due(at("2024-01-06", 9, 0)), None);
        assert_eq!(tr.due(at("2024-01-06", 9, 5)), None);
        assert_eq!(tr.due(at("2024-01-07", 9, 1)), Some(t(9, 0)));
    }

    #[test]
    fn slot_missed_beyond_window_is_skipped() {
        let mut tr = tracker();
        assert_eq!(tr.due(at("2024-01-06", 9, 10)), None);
        assert_eq!(tr.due(at("2024-01-06", 14, 9)), Some(t(14, 0)));
    }

    #[test]
    fn each_slot_is_independent() {
        let mut tr = tracker();
        assert_eq!(tr.due(at("2024-01-06", 9, 0)), Some(t(9, 0)));
        assert_eq!(tr.due(at("2024-01-06", 14, 0)), Some(t(14, 0)));
        assert_eq!(tr.due(at("2024-01-06", 20, 0)), Some(t(20, 0)));
        assert_eq!(tr.due(at("2024-01-06", 20, 1)), None);
    }

    #[test]
    fn late_slot_window_spills_past_midnight() {
        let mut tr = SlotTracker::new(vec![t(23, 55)], chrono::Duration::minutes(10));
        assert_eq!(tr.due(at("2024-01-07", 0, 2)), Some(t(23, 55)));
        assert_eq!(tr.due(at("2024-01-07", 0, 3)), None);
    }

    #[test]
    fn from_config_rejects_bad_times() {
        let config = ScheduleConfig {
            check_times: vec!["9am".into()],
            ..Default::default()
        };
        assert!(CheckSchedule::from_config(&config).is_err());
    }

    #[test]
    fn from_config_rejects_wake_interval_longer_than_window() {
        let config = ScheduleConfig {
            wake_interval_secs: 900,
            window_minutes: 10,
            ..Default::default()
        };
        assert!(CheckSchedule::from_config(&config).is_err());

        let config = ScheduleConfig {
            window_minutes: 0,
            ..Default::default()
        };
        assert!(CheckSchedule::from_config(&config).is_err());
    }

    #[test]
    fn fired_records_are_pruned_after_a_day() {
        let mut tr = tracker();
        for offset in 0..30 {
            let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(offset);
            for slot in [t(9, 0), t(14, 0), t(20, 0)] {
                assert_eq!(tr.due(day.and_time(slot)), Some(slot));
            }
            // today's and yesterday's slots at most
            assert!(tr.fired.len() <= 6, "fired grew to {}", tr.fired.len());
        }
        assert!(tr.fired.iter().all(|(day, _)| *day >= NaiveDate::from_ymd_opt(2024, 1, 29).unwrap()));
    }

    struct AlwaysActive;

    impl ActivitySource for AlwaysActive {
        async fn check_activity(&self, _today: NaiveDate) -> ActivityResult {
            ActivityResult::Active
        }
    }

    #[tokio::test]
    async fn loop_runs_due_slot_and_stops_on_cancel() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(FixedClock::new(at("2024-01-06", 14, 0)));
        let service = Arc::new(
            StreakService::new(
                AlwaysActive,
                StateStore::with_path(dir.path().join(STATE_FILE)),
                ReminderTable::builtin(ReminderMode::Normal),
                clock.clone(),
            )
            .unwrap(),
        );

        let schedule = CheckSchedule {
            slots: vec![t(9, 0), t(14, 0)],
            window: chrono::Duration::minutes(10),
            wake_interval: Duration::from_millis(10),
            check_on_start: false,
        };
        let shutdown = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn(Scheduler::new(schedule, clock).run(
            service.clone(),
            shutdown.clone(),
            tx,
        ));

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.slot, Some(t(14, 0)));
        assert!(matches!(first.result, Ok(CheckReport::Active { streak: 1, .. })));

        // several more wakes, same slot, nothing new
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(rx.try_recv().is_err());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(service.snapshot().await.current_streak, 1);
    }

    #[tokio::test]
    async fn check_on_start_reports_without_slot() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(FixedClock::new(at("2024-01-06", 3, 0)));
        let service = Arc::new(
            StreakService::new(
                AlwaysActive,
                StateStore::with_path(dir.path().join(STATE_FILE)),
                ReminderTable::builtin(ReminderMode::Normal),
                clock.clone(),
            )
            .unwrap(),
        );

        let schedule = CheckSchedule {
            slots: vec![t(9, 0)],
            window: chrono::Duration::minutes(10),
            wake_interval: Duration::from_millis(10),
            check_on_start: true,
        };
        let shutdown = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn(Scheduler::new(schedule, clock).run(service, shutdown.clone(), tx));

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.slot, None);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
