//! Calendar date source for the almanac job.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

/// Almanac rows are keyed in this format, e.g. `20240101`.
pub const DATE_KEY_FORMAT: &str = "%Y%m%d";

pub trait Clock: Send + Sync {
    /// Current calendar date in the clock's zone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock projected into a fixed time zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    zone: Tz,
}

impl SystemClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Shanghai)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.zone).date_naive()
    }
}

/// Always reports the same day. Used by tests and manual back-fills.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn format_ymd(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}
