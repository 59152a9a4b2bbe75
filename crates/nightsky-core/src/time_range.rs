//! Allowed year/month range for the dashboard data and calendar-month windows.

use chrono::{TimeZone, Utc};

use crate::error::FetchError;
use crate::params::FetchParameters;

/// Years for which the backing tables hold data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRangeConfig {
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for TimeRangeConfig {
    fn default() -> Self {
        Self {
            min_year: 2012,
            max_year: 2025,
        }
    }
}

impl TimeRangeConfig {
    pub fn is_valid_year(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }

    pub fn is_valid_month(&self, month: u32) -> bool {
        (1..=12).contains(&month)
    }

    /// Newest first, as the year picker lists them.
    pub fn available_years(&self) -> Vec<i32> {
        (self.min_year..=self.max_year).rev().collect()
    }

    pub fn clamp(&self, year: i32, month: u32) -> (i32, u32) {
        (
            year.clamp(self.min_year, self.max_year),
            month.clamp(1, 12),
        )
    }
}

/// Parameters covering one calendar month: `[first day, first day of next month)`.
pub fn month_window(year: i32, month: u32) -> Result<FetchParameters, FetchError> {
    let invalid = || FetchError::validation(format!("invalid month: {}-{:02}", year, month));
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(invalid)?;
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(invalid)?;
    FetchParameters::new(start, end)
}

/// Parse `YYYY-MM` into a month window.
pub fn parse_month(s: &str) -> Result<FetchParameters, FetchError> {
    let invalid = || FetchError::validation(format!("month must look like 2024-01 (got {:?})", s));
    let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    month_window(year, month)
}
