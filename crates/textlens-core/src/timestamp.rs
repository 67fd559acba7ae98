//! Lenient timestamp parsing and chronological ordering
//!
//! Models write dates in many forms. Anything we can read becomes a UTC
//! instant; anything else sorts as the Unix epoch, i.e. first.

use crate::types::{FinancialItem, InsightCategory, Party};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%d %B %Y"];

/// Parse a model-written time reference into a UTC instant.
///
/// Naive values are read as UTC. Partial dates (`2024-03`, `March 2024`,
/// `2024`) resolve to the first day of the period.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return start_of_day(date);
        }
    }

    // Year-month and month-year
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
        return start_of_day(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {}", s), "%d %B %Y") {
        return start_of_day(date);
    }

    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = s.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1).and_then(start_of_day);
    }

    None
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc())
}

/// Milliseconds since the Unix epoch, or `0` when missing or unreadable.
pub fn timestamp_millis_or_epoch(raw: Option<&str>) -> i64 {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Something carrying an optional model-written timestamp.
pub trait Chronological {
    fn timestamp(&self) -> Option<&str>;
}

impl Chronological for InsightCategory {
    fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }
}

impl Chronological for FinancialItem {
    fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }
}

impl Chronological for Party {
    fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }
}

/// Stable ascending sort by parsed timestamp. Entries that tie, including
/// every entry without a readable timestamp, keep their emitted order.
pub fn sort_by_timestamp<T: Chronological>(items: &mut [T]) {
    items.sort_by_cached_key(|item| timestamp_millis_or_epoch(item.timestamp()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(s: &str) -> i64 {
        timestamp_millis_or_epoch(Some(s))
    }

    #[test]
    fn iso_date_is_midnight_utc() {
        assert_eq!(millis("1970-01-02"), 86_400_000);
    }

    #[test]
    fn rfc3339_with_offset() {
        assert_eq!(millis("1970-01-01T02:00:00+01:00"), 3_600_000);
        assert_eq!(millis("2024-01-15T00:00:00Z"), millis("2024-01-15"));
    }

    #[test]
    fn partial_dates_resolve_to_period_start() {
        assert_eq!(millis("2024-03"), millis("2024-03-01"));
        assert_eq!(millis("March 2024"), millis("2024-03-01"));
        assert_eq!(millis("2024"), millis("2024-01-01"));
    }

    #[test]
    fn month_name_forms() {
        assert_eq!(millis("March 5, 2024"), millis("2024-03-05"));
        assert_eq!(millis("Mar 5, 2024"), millis("2024-03-05"));
        assert_eq!(millis("5 March 2024"), millis("2024-03-05"));
    }

    #[test]
    fn unreadable_is_epoch() {
        assert_eq!(millis("early last spring"), 0);
        assert_eq!(millis(""), 0);
        assert_eq!(timestamp_millis_or_epoch(None), 0);
    }
}
