//! # streakwatch Core Library
//!
//! This library provides the core logic for streakwatch, a tracker that
//! polls a GitHub user's public event feed and keeps a daily activity streak.
//! All operations are exposed through the `streakwatch` CLI binary, which is
//! a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Streak engine**: a pure state machine over calendar dates; one
//!   evaluation per activity check
//! - **Activity poller**: reads the GitHub events API and reduces it to
//!   active / inactive / unknown
//! - **Service**: owns the single in-memory state and serialises checks
//! - **Scheduler**: cancellable loop firing checks at fixed times of day
//! - **Storage**: JSON streak state and TOML configuration
//!
//! ## Key Components
//!
//! - [`evaluate`]: streak transition function
//! - [`StreakService`]: check flow with persistence
//! - [`Scheduler`]: periodic check loop
//! - [`Config`]: application configuration management

pub mod activity;
pub mod clock;
pub mod error;
pub mod logging;
pub mod reminder;
pub mod scheduler;
pub mod service;
pub mod storage;
pub mod streak;

pub use activity::{ActivityResult, ActivitySource, GitHubActivitySource};
pub use clock::{Clock, DayZone, FixedClock, SystemClock};
pub use error::{ActivityError, ConfigError, StorageError};
pub use reminder::{reminder_message, ReminderEntry, ReminderMode, ReminderTable};
pub use scheduler::{CheckSchedule, ScheduledReport, Scheduler, SlotTracker};
pub use service::{CheckReport, StreakService};
pub use storage::{data_dir, Config, StateStore};
pub use streak::{evaluate, Evaluation, Outcome, StreakState};
