//! Week alignment for weekly aggregates.
//!
//! Every weekly figure in the system is keyed by the Sunday that ends its
//! Monday–Sunday week. The helpers here normalize arbitrary calendar dates to
//! that key and render the labels shown next to recommendations.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::errors::DomainError;

const ISO_DATE: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 4] =
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO calendar date (`YYYY-MM-DD`), tolerating a trailing time
/// component.
pub fn parse_date(input: &str) -> Result<NaiveDate, DomainError> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, ISO_DATE) {
        return Ok(date);
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|datetime| datetime.date())
        .ok_or_else(|| DomainError::InvalidDate { input: input.to_owned() })
}

/// Parse `input` and move it to the Sunday ending its week.
pub fn align(input: &str) -> Result<NaiveDate, DomainError> {
    parse_date(input).map(week_end)
}

/// Sunday ending the Monday–Sunday week that contains `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    let weekday = i64::from(date.weekday().num_days_from_monday());
    date + Duration::days((6 - weekday).rem_euclid(7))
}

/// Monday starting the week that contains `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// `"Jan 22 - Jan 28, 2025"` for the week ending on `week_end_date`.
pub fn week_range_label(week_end_date: NaiveDate) -> String {
    let start = week_end_date - Duration::days(6);
    format!("{} - {}", start.format("%b %d"), week_end_date.format("%b %d, %Y"))
}

/// Compact form of [`week_range_label`], e.g. `"Jan 22-28"`.
pub fn short_week_label(week_end_date: NaiveDate) -> String {
    let start = week_end_date - Duration::days(6);
    format!("{}-{}", start.format("%b %d"), week_end_date.format("%d"))
}

/// Week index within the year, counting Monday-start weeks from the first
/// Monday of January. Clamped to `1..=53`.
pub fn week_number(date: NaiveDate) -> u32 {
    let start = week_start(date);
    let jan_1 = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(start);
    let jan_1_weekday = i64::from(jan_1.weekday().num_days_from_monday());
    let first_monday = jan_1 + Duration::days((7 - jan_1_weekday).rem_euclid(7));

    let week = (start - first_monday).num_days().div_euclid(7) + 1;
    week.clamp(1, 53) as u32
}

/// Every week-ending Sunday from `week_end(start)` through `end` inclusive.
pub fn weeks_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut weeks = Vec::new();
    let mut current = week_end(start);
    while current <= end {
        weeks.push(current);
        current += Duration::days(7);
    }
    weeks
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, Weekday};

    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
    }

    #[test]
    fn week_end_is_idempotent_and_always_sunday() {
        let mut current = date("2020-01-01");
        let last = date("2027-12-31");
        while current <= last {
            let aligned = week_end(current);
            assert_eq!(aligned.weekday(), Weekday::Sun, "{current} aligned to {aligned}");
            assert_eq!(week_end(aligned), aligned);
            assert!(aligned >= current && aligned - current < Duration::days(7));
            current += Duration::days(1);
        }
    }

    #[test]
    fn wednesday_maps_to_following_sunday() {
        assert_eq!(week_end(date("2025-01-22")), date("2025-01-26"));
        assert_eq!(week_end(date("2025-01-26")), date("2025-01-26"));
        assert_eq!(week_end(date("2025-01-27")), date("2025-02-02"));
    }

    #[test]
    fn week_start_is_monday_of_same_week() {
        assert_eq!(week_start(date("2025-01-22")), date("2025-01-20"));
        assert_eq!(week_start(date("2025-01-26")), date("2025-01-20"));
        assert_eq!(week_start(date("2025-01-20")), date("2025-01-20"));
    }

    #[test]
    fn labels_span_monday_through_sunday() {
        assert_eq!(week_range_label(date("2025-01-26")), "Jan 20 - Jan 26, 2025");
        assert_eq!(short_week_label(date("2025-01-26")), "Jan 20-26");
        assert_eq!(week_range_label(date("2025-01-05")), "Dec 30 - Jan 05, 2025");
    }

    #[test]
    fn week_number_counts_from_first_monday_and_clamps() {
        assert_eq!(week_number(date("2025-01-22")), 3);
        assert_eq!(week_number(date("2025-01-02")), 1);
        assert_eq!(week_number(date("2025-12-31")), 52);
    }

    #[test]
    fn weeks_between_enumerates_sundays_inclusive() {
        let weeks = weeks_between(date("2025-01-01"), date("2025-01-26"));
        assert_eq!(
            weeks,
            vec![date("2025-01-05"), date("2025-01-12"), date("2025-01-19"), date("2025-01-26")]
        );
    }

    #[test]
    fn weeks_between_is_empty_when_start_week_ends_after_end() {
        assert!(weeks_between(date("2025-01-30"), date("2025-02-01")).is_empty());
    }

    #[test]
    fn parse_accepts_iso_dates_and_datetimes() {
        assert_eq!(parse_date(" 2025-01-22 "), Ok(date("2025-01-22")));
        assert_eq!(parse_date("2025-01-22T08:30:00"), Ok(date("2025-01-22")));
        assert_eq!(parse_date("2025-01-22 08:30:00"), Ok(date("2025-01-22")));
        assert_eq!(align("2025-01-22"), Ok(date("2025-01-26")));
    }

    #[test]
    fn parse_rejects_garbage_with_invalid_date_error() {
        for input in ["", "not-a-date", "2025-02-30", "22/01/2025"] {
            assert_eq!(
                parse_date(input),
                Err(DomainError::InvalidDate { input: input.to_owned() }),
                "input `{input}` should be rejected"
            );
        }
    }
}
