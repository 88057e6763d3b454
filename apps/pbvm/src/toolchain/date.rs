//! Calendar date formatting for listings.
//!
//! Dates are shown as `YYYY.MM.DD` in UTC.

use std::time::{SystemTime, UNIX_EPOCH};

/// A calendar date calculated from a Unix timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Date {
    year: u64,
    month: u64,
    day: u64,
}

impl Date {
    fn from_timestamp(timestamp: u64) -> Self {
        let mut remaining_days = timestamp / 86400;
        let mut year = 1970;

        loop {
            let days_in_year = if is_leap_year(year) { 366 } else { 365 };
            if remaining_days < days_in_year {
                break;
            }
            remaining_days -= days_in_year;
            year += 1;
        }

        let month_days: [u64; 12] = if is_leap_year(year) {
            [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
        } else {
            [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
        };

        let mut month: u64 = 12;
        for (i, &days) in month_days.iter().enumerate() {
            if remaining_days < days {
                month = (i + 1) as u64;
                break;
            }
            remaining_days -= days;
        }

        Self {
            year,
            month,
            day: remaining_days + 1,
        }
    }
}

fn is_leap_year(year: u64) -> bool {
    (year.is_multiple_of(4) && !year.is_multiple_of(100)) || year.is_multiple_of(400)
}

/// Formats a point in time as `YYYY.MM.DD`.
///
/// Times before the Unix epoch are clamped to it.
#[must_use]
pub fn format_date(time: SystemTime) -> String {
    let timestamp = time.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs());
    let date = Date::from_timestamp(timestamp);
    format!("{:04}.{:02}.{:02}", date.year, date.month, date.day)
}

/// Converts the date part of an RFC 3339 timestamp (`2020-05-14T18:36:01Z`)
/// to `YYYY.MM.DD`.
///
/// Input that does not start with a `YYYY-MM-DD` date is returned unchanged.
#[must_use]
pub fn format_rfc3339_date(timestamp: &str) -> String {
    let Some(date) = timestamp.get(..10) else {
        return timestamp.to_string();
    };
    let parts: Vec<&str> = date.split('-').collect();
    let well_formed = parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    if well_formed {
        parts.join(".")
    } else {
        timestamp.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn format_date_produces_dotted_date() {
        assert_eq!(format_date(at(0)), "1970.01.01");
        assert_eq!(format_date(at(86400)), "1970.01.02");
        assert_eq!(format_date(at(1_704_067_200)), "2024.01.01");
    }

    #[test]
    fn format_date_handles_leap_day_and_year_end() {
        // 2024-02-29 12:00:00 UTC
        assert_eq!(format_date(at(1_709_208_000)), "2024.02.29");
        // 2023-12-31 23:59:59 UTC
        assert_eq!(format_date(at(1_704_067_199)), "2023.12.31");
    }

    #[test]
    fn format_date_clamps_pre_epoch() {
        assert_eq!(format_date(UNIX_EPOCH - Duration::from_secs(10)), "1970.01.01");
    }

    #[test]
    fn is_leap_year_correct() {
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
    }

    #[test]
    fn rfc3339_date_is_converted() {
        assert_eq!(format_rfc3339_date("2020-05-14T18:36:01Z"), "2020.05.14");
        assert_eq!(format_rfc3339_date("2020-05-14"), "2020.05.14");
    }

    #[test]
    fn rfc3339_date_passes_through_garbage() {
        assert_eq!(format_rfc3339_date(""), "");
        assert_eq!(format_rfc3339_date("yesterday"), "yesterday");
        assert_eq!(format_rfc3339_date("not-a-date-at-all"), "not-a-date-at-all");
    }
}
