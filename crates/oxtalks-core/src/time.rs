//! Time types and conversions for calendar sources.
//!
//! This module provides [`DateWindow`] for the visible calendar range handed
//! to source transformers, and the helpers feeds use to move between
//! in-process date/times and their wire encodings:
//!
//! - [`epoch_seconds`] - whole seconds since the epoch, truncated toward zero
//! - [`from_epoch_seconds`] / [`from_epoch_millis`] - the reverse direction
//! - [`parse_datetime`] - lenient parsing of human-entered date/time strings

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Naive date/time layouts accepted by [`parse_datetime`], tried in order.
///
/// Values without an offset are read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layout accepted by [`parse_datetime`] (midnight UTC).
const NAIVE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur while parsing a date/time string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    /// The input was empty or only whitespace.
    #[error("empty date/time value")]
    Empty,

    /// The input did not match any supported layout.
    #[error("unrecognized date/time value: {0:?}")]
    Unrecognized(String),
}

/// The visible date range of a calendar view.
///
/// Represents a half-open interval `[start, end)` in UTC. Hosts pass one of
/// these to every transformer when they refresh a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Creates a new date window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "DateWindow start must be <= end");
        Self { start, end }
    }

    /// Returns the window bounds as epoch seconds.
    pub fn as_epoch_seconds(&self) -> (i64, i64) {
        (epoch_seconds(self.start), epoch_seconds(self.end))
    }
}

/// Converts a datetime to whole seconds since the Unix epoch.
///
/// Sub-second precision is dropped by truncating toward zero, never rounded.
pub fn epoch_seconds(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis() / 1000
}

/// Builds a UTC datetime from seconds since the Unix epoch.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn from_epoch_seconds(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Builds a UTC datetime from milliseconds since the Unix epoch.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Parses a human-entered date/time string.
///
/// Accepted forms, in order:
/// - RFC 3339 (`2013-10-01T09:30:00+01:00`)
/// - RFC 2822 (`Tue, 1 Oct 2013 09:30:00 +0100`)
/// - naive date/times (`2013-10-01T09:30:00`, `2013-10-01 09:30`), read as UTC
/// - a bare date (`2013-10-01`), read as midnight UTC
///
/// # Errors
///
/// Returns [`DateParseError`] if the string is empty or matches no layout.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>, DateParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, NAIVE_DATE_FORMAT) {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(DateParseError::Unrecognized(input.to_string()))
}
