//! Wall-clock abstraction.
//!
//! The reset engine never reads the system time directly. Everything goes
//! through a [`Clock`] so day rollover can be driven by advancing a
//! [`ManualClock`] instead of waiting on real timers.

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use std::sync::{Mutex, PoisonError};

/// Source of "now" and of calendar-date projection.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date (no time component) an instant falls on.
    fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.date_naive()
    }

    /// Today's calendar date.
    fn today(&self) -> NaiveDate {
        self.date_of(self.now())
    }
}

/// The real clock. Calendar dates follow the local timezone, so a day
/// rolls over at local midnight.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }
}

/// A settable clock for simulations and tests. Dates are taken in UTC.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Start at midnight UTC of `date` plus `hour` hours.
    pub fn at(date: NaiveDate, hour: u32) -> Self {
        let start = date
            .and_hms_opt(hour.min(23), 0, 0)
            .unwrap_or_default()
            .and_utc();
        Self::new(start)
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        (**self).date_of(at)
    }
}
