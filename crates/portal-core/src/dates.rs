//! Lenient parsing of server-rendered dates.
//!
//! Table cells and data attributes carry dates in whatever format the server
//! rendered them. Parsing is forgiving about the format and never fails
//! loudly: text that is not a date yields `None`, which callers treat as
//! "no classification".

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
];

/// Returns the first line of `text`, trimmed.
///
/// Due-date cells may carry extra lines (extension notices, indicators)
/// after the date itself.
///
/// ```
/// use portal_core::dates::first_line;
///
/// assert_eq!(first_line("  2024-01-10\nExtended by 7 days"), "2024-01-10");
/// ```
pub fn first_line(text: &str) -> &str {
    text.trim().lines().next().unwrap_or_default().trim()
}

/// Parses a calendar date.
///
/// A date followed by a time of day is accepted and the time discarded.
///
/// ```
/// use portal_core::dates::parse_date;
///
/// assert_eq!(parse_date("2024-01-10").unwrap().to_string(), "2024-01-10");
/// assert_eq!(parse_date("01/10/2024").unwrap().to_string(), "2024-01-10");
/// assert_eq!(parse_date("Jan 10, 2024").unwrap().to_string(), "2024-01-10");
/// assert!(parse_date("soon").is_none());
/// ```
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| parse_datetime_only(text).map(|dt| dt.date()))
}

/// Parses a date and time of day.
///
/// A bare date parses as midnight.
///
/// ```
/// use portal_core::dates::parse_datetime;
///
/// let dt = parse_datetime("2024-01-10 14:30").unwrap();
/// assert_eq!(dt.to_string(), "2024-01-10 14:30:00");
/// assert_eq!(parse_datetime("2024-01-10").unwrap().to_string(), "2024-01-10 00:00:00");
/// ```
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    parse_datetime_only(text).or_else(|| {
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
            .map(|date| date.and_time(NaiveTime::MIN))
    })
}

fn parse_datetime_only(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Formats a date the way HTML date inputs expect (`YYYY-MM-DD`).
pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
