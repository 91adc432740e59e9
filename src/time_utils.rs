// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! All calendar questions are answered in UTC.

use chrono::{DateTime, Datelike, SecondsFormat, Utc, Weekday};

const SECONDS_PER_DAY: i64 = 86_400;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Saturday or Sunday.
pub fn is_weekend(date: DateTime<Utc>) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Whether `date` is no more than `days` whole days after the Unix timestamp `start`.
///
/// Dates before `start` count as within.
pub fn within_days_of(date: DateTime<Utc>, start: i64, days: i64) -> bool {
    date.timestamp().saturating_sub(start) <= days.saturating_mul(SECONDS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_format_uses_z_suffix() {
        assert_eq!(
            format_utc_rfc3339(parse("2024-03-09T10:00:00.123+00:00")),
            "2024-03-09T10:00:00Z"
        );
    }

    #[test]
    fn test_is_weekend() {
        assert!(is_weekend(parse("2024-03-09T10:00:00Z"))); // Saturday
        assert!(is_weekend(parse("2024-03-10T23:59:59Z"))); // Sunday
        assert!(!is_weekend(parse("2024-03-11T00:00:00Z"))); // Monday
    }

    #[test]
    fn test_is_weekend_is_utc() {
        // Friday evening in California is already Saturday in UTC
        assert!(is_weekend(parse("2024-03-08T18:00:00-08:00")));
    }

    #[test]
    fn test_within_days_of() {
        let start = parse("2024-01-01T00:00:00Z").timestamp();
        assert!(within_days_of(parse("2024-01-08T00:00:00Z"), start, 7));
        assert!(!within_days_of(parse("2024-01-08T00:00:01Z"), start, 7));
        assert!(within_days_of(parse("2023-12-25T00:00:00Z"), start, 7));
    }

    #[test]
    fn test_within_days_of_extreme_windows() {
        let start = parse("2024-01-01T00:00:00Z").timestamp();
        let date = parse("2030-06-01T00:00:00Z");
        assert!(within_days_of(date, start, i64::MAX));
        assert!(!within_days_of(date, start, i64::MIN));
        assert!(within_days_of(date, i64::MIN, i64::MAX));
    }
}
