//! Fetch parameters: the time window and filters that identify a load session,
//! plus the per-request page window.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

use crate::error::FetchError;

/// Largest `limit` the light-data endpoint accepts.
pub const LIGHT_DATA_MAX_LIMIT: u32 = 10_000;

const INVALID_DATE: &str = "Invalid date format. Use ISO 8601 format (e.g., 2024-01-01T00:00:00Z)";
const START_BEFORE_END: &str = "start_time must be before end_time";

/// Time range plus optional endpoint filters.
///
/// Equality is by value: two parameter sets with the same window and the
/// same filters describe the same load session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchParameters {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub filters: BTreeMap<String, String>,
}

impl FetchParameters {
    /// Build from typed timestamps. Fails when the range is empty or inverted.
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Result<Self, FetchError> {
        let params = Self {
            start_time,
            end_time,
            filters: BTreeMap::new(),
        };
        params.validate()?;
        Ok(params)
    }

    /// Parse ISO-8601 strings (RFC 3339, naive date-time as UTC, or a bare date).
    pub fn parse(start: &str, end: &str) -> Result<Self, FetchError> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    /// Add a filter; an empty value removes the filter instead.
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.filters.remove(&key);
        } else {
            self.filters.insert(key, value);
        }
        self
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        if self.start_time >= self.end_time {
            return Err(FetchError::validation(START_BEFORE_END));
        }
        Ok(())
    }

    /// Query pairs for one page request: window first, then filters.
    pub fn query_pairs(&self, window: PageWindow) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("start_time".to_string(), iso_string(&self.start_time)),
            ("end_time".to_string(), iso_string(&self.end_time)),
            ("limit".to_string(), window.limit.to_string()),
            ("offset".to_string(), window.offset.to_string()),
        ];
        pairs.extend(
            self.filters
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        pairs
    }
}

/// One page slice of the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u32,
    pub offset: u64,
}

impl PageWindow {
    /// Window for the zero-based `page` with a fixed `batch_size`.
    pub fn for_page(page: u64, batch_size: u32) -> Self {
        Self {
            limit: batch_size,
            offset: page * u64::from(batch_size),
        }
    }

    /// Check `limit` against the endpoint maximum (if the endpoint has one).
    pub fn validate(&self, max_limit: Option<u32>) -> Result<(), FetchError> {
        match max_limit {
            Some(max) if self.limit == 0 || self.limit > max => Err(FetchError::validation(
                format!("limit must be a number between 1 and {}", max),
            )),
            None if self.limit == 0 => {
                Err(FetchError::validation("limit must be a positive integer"))
            }
            _ => Ok(()),
        }
    }
}

/// Render like JavaScript's `toISOString()`: millisecond precision, `Z` suffix.
pub fn iso_string(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, FetchError> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(FetchError::validation(INVALID_DATE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_accepts_rfc3339_and_bare_dates() {
        let p = FetchParameters::parse("2024-01-01T00:00:00Z", "2024-01-31").unwrap();
        assert_eq!(p.start_time, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(p.end_time, Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn parse_converts_offsets_to_utc() {
        let t = parse_timestamp("2024-01-01T08:00:00+08:00").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let naive = parse_timestamp("2024-03-05T12:30:00").unwrap();
        assert_eq!(naive, Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap());
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = FetchParameters::parse("yesterday", "2024-01-31").unwrap_err();
        assert_eq!(err.to_string(), INVALID_DATE);
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn start_must_precede_end() {
        let err = FetchParameters::parse("2024-02-01", "2024-02-01").unwrap_err();
        assert_eq!(err.to_string(), START_BEFORE_END);
        assert!(FetchParameters::parse("2024-03-01", "2024-02-01").is_err());
    }

    #[test]
    fn equality_is_by_value_including_filters() {
        let a = FetchParameters::parse("2024-01-01", "2024-02-01").unwrap();
        let b = FetchParameters::parse("2024-01-01T00:00:00.000Z", "2024-02-01").unwrap();
        assert_eq!(a, b);
        let c = b.clone().with_filter("county", "臺北市");
        assert_ne!(a, c);
        assert_eq!(c.clone().with_filter("county", ""), a);
    }

    #[test]
    fn query_pairs_use_iso_strings_and_window() {
        let p = FetchParameters::parse("2024-01-01", "2024-02-01")
            .unwrap()
            .with_filter("bio_group", "鳥類");
        let pairs = p.query_pairs(PageWindow::for_page(2, 100));
        assert_eq!(pairs[0], ("start_time".into(), "2024-01-01T00:00:00.000Z".into()));
        assert_eq!(pairs[1], ("end_time".into(), "2024-02-01T00:00:00.000Z".into()));
        assert_eq!(pairs[2], ("limit".into(), "100".into()));
        assert_eq!(pairs[3], ("offset".into(), "200".into()));
        assert_eq!(pairs[4], ("bio_group".into(), "鳥類".into()));
    }

    #[test]
    fn window_limit_bounds() {
        let max = Some(LIGHT_DATA_MAX_LIMIT);
        assert!(PageWindow { limit: 1, offset: 0 }.validate(max).is_ok());
        assert!(PageWindow { limit: 10_000, offset: 0 }.validate(max).is_ok());
        assert!(PageWindow { limit: 10_001, offset: 0 }.validate(max).is_err());
        assert!(PageWindow { limit: 0, offset: 0 }.validate(max).is_err());
        assert!(PageWindow { limit: 50_000, offset: 0 }.validate(None).is_ok());
        assert!(PageWindow { limit: 0, offset: 0 }.validate(None).is_err());
    }
}
