//! Statement date parsing.
//!
//! Banks export dates in several shapes:
//!   2025-11-05            (Swedbank, generic)
//!   2025-11-05 14:32:10   (Revolut "Completed Date")
//!   05.11.2025            (Lithuanian locale exports)
//!   11/05/2025            (US exports)

use chrono::{NaiveDate, NaiveDateTime};

/// Date-only formats, tried in order; the first successful parse wins.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a statement date, ignoring a trailing time of day.
///
/// Note `%d/%m/%Y` is tried before `%m/%d/%Y`, so "03/04/2025" is 3 April;
/// the US form only wins when the first number cannot be a day-of-month pair.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // "2025-11-05T10:00:00Z", "2025-11-05T10:00:00.123+02:00", ...
    let head = s.get(..10)?;
    if s[10..].starts_with(['T', ' ']) {
        return NaiveDate::parse_from_str(head, "%Y-%m-%d").ok();
    }
    None
}
