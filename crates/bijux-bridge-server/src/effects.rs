// SPDX-License-Identifier: Apache-2.0

use chrono::{NaiveDate, Utc};

/// Source of the calendar date stamped on legacy records.
pub trait ClockAdapter: Send + Sync {
    /// Today's date as `YYYY-MM-DD`.
    fn today(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockAdapter for SystemClock {
    fn today(&self) -> String {
        Utc::now().date_naive().format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl ClockAdapter for FixedClock {
    fn today(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_formats_iso_date() {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2026, 3, 9).expect("date"));
        assert_eq!(clock.today(), "2026-03-09");
    }

    #[test]
    fn system_clock_yields_parseable_date() {
        let today = SystemClock.today();
        assert!(NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }
}
