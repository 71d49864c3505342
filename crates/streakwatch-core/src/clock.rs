//! Wall-clock access and the time zone used to decide what "today" is.

use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time zone in which calendar days are counted.
///
/// The same zone drives the scheduler clock, so with `Utc` a `09:00` slot
/// fires at 09:00 UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayZone {
    /// The machine's local time zone.
    #[default]
    Local,
    Utc,
}

impl DayZone {
    /// Current wall-clock time in this zone.
    pub fn now(&self) -> NaiveDateTime {
        match self {
            DayZone::Local => Local::now().naive_local(),
            DayZone::Utc => Utc::now().naive_utc(),
        }
    }

    /// Calendar day on which `ts` falls in this zone.
    pub fn date_of(&self, ts: &DateTime<Utc>) -> NaiveDate {
        match self {
            DayZone::Local => ts.with_timezone(&Local).date_naive(),
            DayZone::Utc => ts.date_naive(),
        }
    }
}

/// Source of the current time, replaceable in tests.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

pub struct SystemClock {
    zone: DayZone,
}

impl SystemClock {
    pub fn new(zone: DayZone) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        self.zone.now()
    }
}

/// Clock frozen at a settable instant.
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
