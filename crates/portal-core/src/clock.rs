//! Wall-clock abstraction.
//!
//! Behaviors compare server-rendered dates against "now". Reading the time
//! through [`Clock`] lets tests pin "now" to a fixed instant.

use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

/// A source of the current local date and time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Returns the current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The system clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a single instant.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use portal_core::clock::{Clock, FixedClock};
///
/// let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
/// assert_eq!(clock.today().to_string(), "2024-01-10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    /// Creates a clock frozen at `now`.
    pub const fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Creates a clock frozen at noon of `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self::new(
            date.and_hms_opt(12, 0, 0)
                .unwrap_or_else(|| date.and_time(NaiveTime::MIN)),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}
