//! Timestamp utilities
//!
//! Open-data endpoints publish dates as Socrata "floating timestamps"
//! (`2023-01-01T00:00:00.000`) but older rows and hand-loaded datasets also
//! carry plain dates or day-first dates. Everything is handled as a naive
//! local timestamp; the source carries no offset.

use chrono::{DateTime, Local, Months, NaiveDate, NaiveDateTime};

/// Datetime layouts tried in order after RFC 3339
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Date-only layouts, interpreted as midnight
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Current local wall-clock time as a naive timestamp
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parse a timestamp string in any of the accepted layouts.
///
/// Returns `None` for empty or unrecognised input. RFC 3339 values with an
/// explicit offset keep their wall-clock reading.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Add calendar months, clamping to the last day of the target month.
///
/// Saturates at the input value if the result would overflow chrono's range.
pub fn add_months(start: NaiveDateTime, months: u32) -> NaiveDateTime {
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(start)
}
