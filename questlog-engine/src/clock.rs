//! Wall-clock implementations of the [`Clock`] seam.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::Clock;

/// Device-local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock for tests and simulations.
///
/// Clones share the same instant, so a test can hold one handle while the
/// engine owns another and move time for both.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<RefCell<NaiveDateTime>>,
}

impl ManualClock {
    /// Clock frozen at the start of `date`.
    #[must_use]
    pub fn at(date: NaiveDate) -> Self {
        Self {
            now: Rc::new(RefCell::new(
                date.and_hms_opt(0, 0, 0).unwrap_or_default(),
            )),
        }
    }

    /// Jump to the start of `date`.
    pub fn set_date(&self, date: NaiveDate) {
        *self.now.borrow_mut() = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    }

    /// Move forward by whole days, keeping the time of day.
    pub fn advance_days(&self, days: u64) {
        let mut now = self.now.borrow_mut();
        *now = *now + chrono::Days::new(days);
    }

    /// Set the exact instant.
    pub fn set_now(&self, now: NaiveDateTime) {
        *self.now.borrow_mut() = now;
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        self.now.borrow().date()
    }

    fn now(&self) -> NaiveDateTime {
        *self.now.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::at(date(2024, 1, 1));
        let handle = clock.clone();
        handle.advance_days(3);
        assert_eq!(clock.today(), date(2024, 1, 4));
    }

    #[test]
    fn advance_days_crosses_month_boundaries() {
        let clock = ManualClock::at(date(2024, 1, 31));
        clock.advance_days(1);
        assert_eq!(clock.today(), date(2024, 2, 1));
    }
}
