//! Date window router
//!
//! Splits the days from a start date up to (not including) a cutoff into
//! fixed-size windows.

use super::types::DateWindow;
use crate::error::{Error, Result};
use chrono::{Days, NaiveDate, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fixed-size date window router
#[derive(Debug, Clone)]
pub struct DateWindowRouter {
    /// First day of the first window
    start: NaiveDate,
    /// Windows start strictly before this day
    until: NaiveDate,
    /// Days per window
    step_days: u32,
}

impl DateWindowRouter {
    /// Create a router. A zero step is rejected.
    pub fn new(start: NaiveDate, until: NaiveDate, step_days: u32) -> Result<Self> {
        if step_days == 0 {
            return Err(Error::invalid_value("window_days", "must be at least 1"));
        }
        Ok(Self {
            start,
            until,
            step_days,
        })
    }

    /// Windows from `start` up to today (UTC)
    pub fn until_today(start: NaiveDate, step_days: u32) -> Result<Self> {
        Self::new(start, Utc::now().date_naive(), step_days)
    }

    /// Create from a `YYYY-MM-DD` start date
    pub fn from_str_until_today(start: &str, step_days: u32) -> Result<Self> {
        Self::until_today(parse_date(start)?, step_days)
    }

    /// All windows in order.
    ///
    /// The last window always spans the full step, even when it reaches
    /// past the cutoff.
    pub fn windows(&self) -> Vec<DateWindow> {
        let step = Days::new(u64::from(self.step_days));
        let span = Days::new(u64::from(self.step_days - 1));

        let mut windows = Vec::new();
        let mut current = self.start;

        while current < self.until {
            let Some(end) = current.checked_add_days(span) else {
                break;
            };
            windows.push(DateWindow::new(current, end));

            match current.checked_add_days(step) {
                Some(next) => current = next,
                None => break,
            }
        }

        windows
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn until(&self) -> NaiveDate {
        self.until
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| Error::invalid_value("start", format!("'{s}' is not a YYYY-MM-DD date: {e}")))
}
