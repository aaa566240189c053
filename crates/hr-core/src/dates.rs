//! Date storage and display conventions
//!
//! Calendar dates are stored as UTC midnight. Anything shown to a user is
//! shifted by a fixed +05:30 (IST) offset; all users are assumed to be in that
//! single timezone.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::HrError;

/// +05:30 in seconds
pub const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECONDS).expect("IST offset is within ±24h")
}

/// Parse a `YYYY-MM-DD` string, reporting failures against `field`
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, HrError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| HrError::invalid(field, "must be a date in YYYY-MM-DD format"))
}

/// Parse a `YYYY-MM` month into its first day
pub fn parse_month(field: &str, value: &str) -> Result<NaiveDate, HrError> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), DATE_FORMAT)
        .map_err(|_| HrError::invalid(field, "must be a month in YYYY-MM format"))
}

/// The storage representation of a calendar date
pub fn to_utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Normalize a submitted date for storage.
///
/// Accepts `YYYY-MM-DD` (taken as-is) or an RFC 3339 timestamp, whose UTC
/// calendar day is kept. A timestamp submitted in IST before 05:30 therefore
/// lands on the previous day; that is the known boundary of this convention.
pub fn normalize_submitted(field: &str, value: &str) -> Result<DateTime<Utc>, HrError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(to_utc_midnight(date));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|ts| to_utc_midnight(ts.with_timezone(&Utc).date_naive()))
        .map_err(|_| HrError::invalid(field, "must be a date in YYYY-MM-DD format"))
}

/// Shift a stored instant into the display offset
pub fn to_display(instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(&ist())
}

/// Calendar day a stored instant renders as
pub fn display_date(instant: DateTime<Utc>) -> NaiveDate {
    to_display(instant).date_naive()
}

/// `YYYY-MM-DD` rendering of a stored instant
pub fn format_display_date(instant: DateTime<Utc>) -> String {
    display_date(instant).format(DATE_FORMAT).to_string()
}

/// Current calendar day in the display offset
pub fn today() -> NaiveDate {
    display_date(Utc::now())
}

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stored_midnight_displays_same_day() {
        for day in [date(2024, 1, 1), date(2024, 2, 29), date(2024, 12, 31)] {
            let stored = to_utc_midnight(day);
            assert_eq!(display_date(stored), day);
        }
    }

    #[test]
    fn test_round_trip_of_submitted_date() {
        let stored = normalize_submitted("date", "2024-06-15").unwrap();
        assert_eq!(format_display_date(stored), "2024-06-15");
    }

    #[test]
    fn test_midday_timestamp_keeps_its_day() {
        let stored = normalize_submitted("date", "2024-06-15T12:00:00+05:30").unwrap();
        assert_eq!(display_date(stored), date(2024, 6, 15));
    }

    #[test]
    fn test_early_ist_timestamp_falls_on_previous_day() {
        // 02:00 IST is 20:30 UTC the previous evening
        let stored = normalize_submitted("date", "2024-06-15T02:00:00+05:30").unwrap();
        assert_eq!(display_date(stored), date(2024, 6, 14));
    }

    #[test]
    fn test_late_utc_instant_displays_next_day() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 14, 19, 0, 0).unwrap();
        assert_eq!(display_date(instant), date(2024, 6, 15));

        let before_boundary = Utc.with_ymd_and_hms(2024, 6, 14, 18, 29, 59).unwrap();
        assert_eq!(display_date(before_boundary), date(2024, 6, 14));
    }

    #[test]
    fn test_parse_errors_name_the_field() {
        match parse_date("startDate", "15/06/2024") {
            Err(HrError::Validation(errors)) => assert!(errors.has_error("startDate")),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(parse_month("month", "2024-13").is_err());
        assert_eq!(parse_month("month", "2024-02").unwrap(), date(2024, 2, 1));
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(date(2024, 2, 10)), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(month_bounds(date(2023, 12, 31)), (date(2023, 12, 1), date(2023, 12, 31)));
    }
}
