use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::DateError;
use crate::models::DateRequest;

// ── Reporting window ──────────────────────────────────────────────────────────

/// First day a report may be requested for.
pub fn range_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Last day (inclusive) a report may be requested for.
pub fn range_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or(NaiveDate::MAX)
}

fn request_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("regex is valid"))
}

// ── Request-date validation ───────────────────────────────────────────────────

/// Parse and validate a caller-supplied report date.
///
/// The string must be exactly `YYYY-MM-DD`, name a real calendar day, and
/// fall inside [`range_start`]..=[`range_end`].
pub fn parse_request_date(s: &str) -> Result<DateRequest, DateError> {
    if s.is_empty() {
        return Err(DateError::EmptyInput);
    }
    if !request_pattern().is_match(s) {
        return Err(DateError::FormatError(s.to_string()));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| DateError::FormatError(s.to_string()))?;

    let (start, end) = (range_start(), range_end());
    if date < start || date > end {
        let days_outside = (date - start)
            .num_days()
            .abs()
            .min((date - end).num_days().abs());
        return Err(DateError::OutOfRange { date, days_outside });
    }

    Ok(DateRequest::new(date))
}

/// Validate without keeping the parsed value.
pub fn validate(s: &str) -> Result<(), DateError> {
    parse_request_date(s).map(|_| ())
}

// ── Lenient invoice-date parsing ──────────────────────────────────────────────

/// Date-only layouts tried in order. Month-first precedes day-first so that
/// ambiguous `01/02/2024` reads as 2 January.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
];

/// Date-time layouts without an offset.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-time layouts carrying a numeric offset.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%z"];

/// Best-effort conversion of an invoice date cell to a calendar date.
///
/// Accepts the representations commonly found in exported invoice data.
/// Time-of-day and offsets are discarded; the wall-clock date is kept.
/// Returns `None` when nothing matches.
pub fn parse_invoice_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let (y, rest) = s.split_at(4);
        let (m, d) = rest.split_at(2);
        return NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?);
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    let normalised = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(stripped) => format!("{}+00:00", stripped),
        None => s.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.date_naive());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalised, fmt) {
            return Some(dt.date_naive());
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// `"YYYY-MM"` grouping key for a date.
pub fn invoice_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── parse_request_date ────────────────────────────────────────────────────

    #[test]
    fn test_every_day_of_2024_is_valid() {
        let mut day = range_start();
        let mut count = 0;
        while day <= range_end() {
            let s = day.format("%Y-%m-%d").to_string();
            assert!(validate(&s).is_ok(), "{} should be valid", s);
            day = day.succ_opt().unwrap();
            count += 1;
        }
        assert_eq!(count, 366);
    }

    #[test]
    fn test_request_date_round_trips_display() {
        let req = parse_request_date("2024-06-15").unwrap();
        assert_eq!(req.date(), ymd(2024, 6, 15));
        assert_eq!(req.to_string(), "2024-06-15");
    }

    #[test]
    fn test_day_before_range_is_out_of_range() {
        assert_eq!(
            validate("2023-12-31"),
            Err(DateError::OutOfRange {
                date: ymd(2023, 12, 31),
                days_outside: 1,
            })
        );
    }

    #[test]
    fn test_day_after_range_is_out_of_range() {
        assert_eq!(
            validate("2025-01-01"),
            Err(DateError::OutOfRange {
                date: ymd(2025, 1, 1),
                days_outside: 1,
            })
        );
    }

    #[test]
    fn test_out_of_range_reports_distance_to_nearest_bound() {
        match validate("2025-03-01") {
            Err(DateError::OutOfRange { days_outside, .. }) => assert_eq!(days_outside, 60),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_calendar_invalid_dates_are_format_errors() {
        assert!(matches!(validate("2024-13-01"), Err(DateError::FormatError(_))));
        assert!(matches!(validate("2024-02-30"), Err(DateError::FormatError(_))));
    }

    #[test]
    fn test_malformed_strings_are_format_errors() {
        for s in ["not-a-date", "2024/01/01", "2024-1-5", " 2024-01-05", "2024-01-05T00:00"] {
            assert!(
                matches!(validate(s), Err(DateError::FormatError(_))),
                "{:?} should be a format error",
                s
            );
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(validate(""), Err(DateError::EmptyInput));
    }

    #[test]
    fn test_leap_day_is_valid() {
        assert!(validate("2024-02-29").is_ok());
    }

    // ── parse_invoice_date ────────────────────────────────────────────────────

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_invoice_date("2024-01-05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_invoice_date("  2024-01-05 "), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_parse_alternative_separators() {
        assert_eq!(parse_invoice_date("2024/01/05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_invoice_date("2024.01.05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_invoice_date("20240105"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_parse_month_first_then_day_first() {
        assert_eq!(parse_invoice_date("01/02/2024"), Some(ymd(2024, 1, 2)));
        assert_eq!(parse_invoice_date("25/01/2024"), Some(ymd(2024, 1, 25)));
    }

    #[test]
    fn test_parse_month_names() {
        assert_eq!(parse_invoice_date("Jan 5, 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_invoice_date("5 January 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_invoice_date("05-Jan-2024"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_parse_datetimes_keep_wall_clock_date() {
        assert_eq!(
            parse_invoice_date("2024-01-31T23:30:00Z"),
            Some(ymd(2024, 1, 31))
        );
        assert_eq!(
            parse_invoice_date("2024-01-31T23:30:00-05:00"),
            Some(ymd(2024, 1, 31))
        );
        assert_eq!(
            parse_invoice_date("2024-01-31 08:15:00"),
            Some(ymd(2024, 1, 31))
        );
        assert_eq!(
            parse_invoice_date("2024-01-31T08:15:00.250"),
            Some(ymd(2024, 1, 31))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_invoice_date(""), None);
        assert_eq!(parse_invoice_date("   "), None);
        assert_eq!(parse_invoice_date("not-a-date"), None);
        assert_eq!(parse_invoice_date("2024-02-30"), None);
        assert_eq!(parse_invoice_date("99999999"), None);
    }

    // ── invoice_month ─────────────────────────────────────────────────────────

    #[test]
    fn test_invoice_month() {
        assert_eq!(invoice_month(ymd(2024, 1, 5)), "2024-01");
        assert_eq!(invoice_month(ymd(2024, 12, 31)), "2024-12");
    }
}
