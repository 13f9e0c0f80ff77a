//! Injectable time source.
//!
//! Every calendar-dependent query reads "today" through a [`Clock`] so the
//! scheduler stays deterministic under test.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};

pub trait Clock: Send + Sync {
    /// Current instant, used for achievement unlock markers
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date as seen by the user
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time; "today" follows the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Midnight UTC on the given date
    pub fn on(date: NaiveDate) -> Self {
        Self {
            now: date.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
