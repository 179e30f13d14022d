//! Date arithmetic and formatting for the month-day lookup keys.
//!
//! The remote service is year-agnostic: every lookup is addressed by a
//! zero-padded `MM-DD` key, so the year is intentionally discarded when
//! encoding. All functions here are pure; none of them consult the ambient
//! system locale.

use chrono::{Datelike, Local, NaiveDate, TimeDelta};

use crate::config::Locale;

/// Encode a date as the zero-padded `MM-DD` lookup key.
pub fn encode(date: NaiveDate) -> String {
    format!("{:02}-{:02}", date.month(), date.day())
}

/// Header string of the form `"YYYY. MM. DD."`.
pub fn format_long_date(date: NaiveDate) -> String {
    format!("{:04}. {:02}. {:02}.", date.year(), date.month(), date.day())
}

/// Weekday name for `date` in the given locale.
pub fn format_weekday(date: NaiveDate, locale: Locale) -> &'static str {
    locale.weekday_name(date.weekday())
}

/// Shift a date by `n` days in either direction. Month and year rollover,
/// leap days included, is handled by the calendar arithmetic.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + TimeDelta::days(n)
}

/// The current local calendar date, the default cursor position.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
