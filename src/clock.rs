use std::{cell::Cell, fmt, rc::Rc};

use chrono::{Days, Local, NaiveDate};

/// Source of "today" for loans, returns and fee quotes
pub trait Clock: fmt::Debug {
    /// The current calendar date
    fn today(&self) -> NaiveDate;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Reads the local system date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that stays on one date until moved
///
/// Used for the CLI `--today` override and for tests that need a loan to
/// become overdue.
#[derive(Debug, Clone)]
pub struct FixedClock {
    /// The date reported by [`Clock::today`]
    date: Cell<NaiveDate>,
}

impl FixedClock {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self { date: Cell::new(date) }
    }

    /// Move forward by whole days, stopping at the end of the calendar
    pub fn advance(&self, days: u64) {
        let current = self.date.get();
        self.date.set(current.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX));
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date.get()
    }
}
