//! Wall-clock access.
//!
//! Every date stored by the application is a local calendar date derived
//! through a [`Clock`], never the UTC date of a timestamp.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use parking_lot::Mutex;

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;

    /// Device-local calendar date of an instant
    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate;

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }

    /// Local date `days` before today
    fn days_ago(&self, days: i64) -> NaiveDate {
        self.today() - Duration::days(days)
    }
}

/// System time in the host's timezone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Local).date_naive()
    }
}

/// Settable clock pinned to a fixed UTC offset
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Mutex::new(now),
            offset,
        }
    }

    /// Clock reading `local` wall time in a zone `offset_hours` east of UTC.
    /// Returns `None` for an out-of-range offset.
    pub fn at_local(local: NaiveDateTime, offset_hours: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(offset_hours * 3600)?;
        let now = offset.from_local_datetime(&local).single()?.with_timezone(&Utc);
        Some(Self::new(now, offset))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}
