//! Time source and UTC calendar helpers.
//!
//! # Responsibility
//! - Abstract "now" so services can be driven by a fixed clock in tests.
//! - Compute day and Monday-aligned week boundaries in epoch milliseconds.
//!
//! # Invariants
//! - Days and weeks are UTC calendar units.
//! - Week ranges are inclusive: Monday 00:00:00.000 to Sunday 23:59:59.999.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Returns `None` when `epoch_ms` is outside chrono's supported range.
    pub fn at_epoch_ms(epoch_ms: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(epoch_ms).map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Inclusive millisecond range covering one calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl WeekRange {
    /// Week containing `instant`.
    pub fn containing(instant: DateTime<Utc>) -> Self {
        let date = instant.date_naive();
        let monday = date
            .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
            .unwrap_or(date);
        let start_ms = date_start_ms(monday);
        Self {
            start_ms,
            end_ms: start_ms + WEEK_MS - 1,
        }
    }

    /// The week `weeks` before this one.
    pub fn previous(self, weeks: u32) -> Self {
        let shift = WEEK_MS * i64::from(weeks);
        Self {
            start_ms: self.start_ms - shift,
            end_ms: self.end_ms - shift,
        }
    }

    pub fn contains(&self, epoch_ms: i64) -> bool {
        epoch_ms >= self.start_ms && epoch_ms <= self.end_ms
    }
}

/// UTC midnight of the day containing `instant`, in epoch milliseconds.
pub fn start_of_day_ms(instant: DateTime<Utc>) -> i64 {
    date_start_ms(instant.date_naive())
}

/// UTC midnight `days` after the day containing `instant`.
///
/// Returns `None` on calendar overflow.
pub fn start_of_day_after_ms(instant: DateTime<Utc>, days: u32) -> Option<i64> {
    instant
        .date_naive()
        .checked_add_days(Days::new(u64::from(days)))
        .map(date_start_ms)
}

/// Normalizes an arbitrary epoch timestamp to its UTC start of day.
pub fn truncate_to_day_ms(epoch_ms: i64) -> Option<i64> {
    DateTime::from_timestamp_millis(epoch_ms).map(start_of_day_ms)
}

fn date_start_ms(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}
