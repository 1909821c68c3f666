//! Wall-clock source, injectable so cache expiry and seasonal content can be
//! driven from tests.

use std::sync::Mutex;

use chrono::{DateTime, Datelike, Duration, Utc};

/// Korea Standard Time offset from UTC.
const KST_OFFSET_HOURS: i64 = 9;

/// Calendar month (1..=12) of `at` in Korea Standard Time.
pub fn kst_month(at: DateTime<Utc>) -> u32 {
    (at + Duration::hours(KST_OFFSET_HOURS)).month()
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
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

    pub fn set(&self, at: DateTime<Utc>) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
