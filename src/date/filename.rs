//! Filename timestamp parsing

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

/// Pattern: YYYYMMDD followed by an optional separator and HHMMSS
static PATTERN_FULL: OnceLock<Regex> = OnceLock::new();

/// Pattern: bare YYYYMMDD
static PATTERN_DATE_ONLY: OnceLock<Regex> = OnceLock::new();

fn pattern_full() -> &'static Regex {
    PATTERN_FULL.get_or_init(|| Regex::new(r"(\d{8})[_\-]?(\d{6})").unwrap())
}

fn pattern_date_only() -> &'static Regex {
    PATTERN_DATE_ONLY.get_or_init(|| Regex::new(r"(\d{8})").unwrap())
}

/// A timestamp recovered from a filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameStamp {
    /// Date and time both present
    Full(NaiveDateTime),
    /// Date only; time must come from elsewhere
    DateOnly(NaiveDate),
}

/// Scan a filename for an embedded timestamp.
///
/// A full `YYYYMMDD[_-]HHMMSS` match wins over a bare `YYYYMMDD`; digit
/// runs that are not valid calendar dates are ignored.
pub fn parse_filename_timestamp(name: &str) -> Option<FilenameStamp> {
    if let Some(caps) = pattern_full().captures(name)
        && let Some(dt) = build_datetime(&caps[1], &caps[2])
    {
        return Some(FilenameStamp::Full(dt));
    }

    if let Some(caps) = pattern_date_only().captures(name)
        && let Some(date) = build_date(&caps[1])
    {
        return Some(FilenameStamp::DateOnly(date));
    }

    None
}

fn build_date(date: &str) -> Option<NaiveDate> {
    let year: i32 = date[..4].parse().ok()?;
    let month: u32 = date[4..6].parse().ok()?;
    let day: u32 = date[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn build_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let hour: u32 = time[..2].parse().ok()?;
    let minute: u32 = time[2..4].parse().ok()?;
    let second: u32 = time[4..6].parse().ok()?;
    build_date(date)?.and_hms_opt(hour, minute, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_full_timestamp() {
        let stamp = parse_filename_timestamp("20240115_143000.jpg").unwrap();
        let FilenameStamp::Full(dt) = stamp else {
            panic!("expected full stamp");
        };
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 14);

        // Hyphen separator and no separator
        assert!(matches!(
            parse_filename_timestamp("20240115-143000.jpg"),
            Some(FilenameStamp::Full(_))
        ));
        assert!(matches!(
            parse_filename_timestamp("VID20240115143000.mp4"),
            Some(FilenameStamp::Full(_))
        ));
    }

    #[test]
    fn test_date_only() {
        let stamp = parse_filename_timestamp("scan-20030712 roll3.jpg").unwrap();
        assert_eq!(
            stamp,
            FilenameStamp::DateOnly(NaiveDate::from_ymd_opt(2003, 7, 12).unwrap())
        );
    }

    #[test]
    fn test_prefixed_camera_names() {
        assert!(matches!(
            parse_filename_timestamp("IMG_20240115_143000.jpg"),
            Some(FilenameStamp::Full(_))
        ));
        assert!(matches!(
            parse_filename_timestamp("IMG-20240115-WA0001.jpg"),
            Some(FilenameStamp::DateOnly(_))
        ));
    }

    #[test]
    fn test_invalid_digit_runs_rejected() {
        // 13th month is not a date
        assert_eq!(parse_filename_timestamp("20241315_143000.jpg"), None);
        assert_eq!(parse_filename_timestamp("photo.jpg"), None);
        assert_eq!(parse_filename_timestamp("00000000_000000.jpg"), None);
    }

    #[test]
    fn test_invalid_time_rejected_but_date_kept() {
        // 25th hour is not a time; the date run still matches alone
        let stamp = parse_filename_timestamp("20240115_253000.jpg").unwrap();
        assert!(matches!(stamp, FilenameStamp::DateOnly(_)));
    }
}
