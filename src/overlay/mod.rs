//! Caption burn-in
//!
//! Renders a human-readable capture date (plus optional free text) into
//! the pixels of an image or video, bottom-right, outlined for
//! legibility against any background.

pub mod image;
pub mod video;

use crate::date::{month_name, DateStamp, ResolvedTimestamp};
use chrono::Datelike;

/// "1st", "2nd", "3rd", "4th", ... with the teens special-cased
fn ordinal(day: u32) -> String {
    let suffix = match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{}{}", day, suffix)
}

/// Long-form date for the overlay: "3rd June 2024", "June 1974" for
/// month-only stamps, the bare year for year-only ones. Literal stamps
/// appear verbatim; the sentinel renders nothing.
pub fn format_date(resolved: &ResolvedTimestamp) -> String {
    match &resolved.date {
        DateStamp::Day(d) => format!(
            "{} {} {}",
            ordinal(d.day()),
            month_name(d.month()),
            d.year()
        ),
        DateStamp::Month { year, month } => format!("{} {}", month_name(*month), year),
        DateStamp::Year(year) => year.to_string(),
        DateStamp::Literal(raw) => raw.clone(),
        DateStamp::Unknown => String::new(),
    }
}

/// Full caption line: the date, then any custom text after a separator.
pub fn caption(resolved: &ResolvedTimestamp, custom_text: Option<&str>) -> String {
    let date = format_date(resolved);
    match custom_text.filter(|t| !t.trim().is_empty()) {
        Some(text) if date.is_empty() => text.trim().to_string(),
        Some(text) => format!("{} | {}", date, text.trim()),
        None => date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateSource;
    use chrono::NaiveDate;

    fn day_stamp(y: i32, m: u32, d: u32) -> ResolvedTimestamp {
        ResolvedTimestamp {
            date: DateStamp::Day(NaiveDate::from_ymd_opt(y, m, d).unwrap()),
            time: None,
            source: DateSource::Metadata,
        }
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(23), "23rd");
        assert_eq!(ordinal(31), "31st");
    }

    #[test]
    fn test_format_date_variants() {
        assert_eq!(format_date(&day_stamp(2024, 6, 3)), "3rd June 2024");

        let month = ResolvedTimestamp {
            date: DateStamp::Month { year: 1974, month: 6 },
            time: None,
            source: DateSource::Override,
        };
        assert_eq!(format_date(&month), "June 1974");

        let year = ResolvedTimestamp {
            date: DateStamp::Year(1974),
            time: None,
            source: DateSource::Override,
        };
        assert_eq!(format_date(&year), "1974");

        let literal = ResolvedTimestamp {
            date: DateStamp::Literal("circa 1950".to_string()),
            time: None,
            source: DateSource::Override,
        };
        assert_eq!(format_date(&literal), "circa 1950");
    }

    #[test]
    fn test_caption_with_custom_text() {
        let stamp = day_stamp(2024, 6, 3);
        assert_eq!(caption(&stamp, None), "3rd June 2024");
        assert_eq!(caption(&stamp, Some("Nonna's garden")), "3rd June 2024 | Nonna's garden");
        assert_eq!(caption(&stamp, Some("   ")), "3rd June 2024");

        let unknown = ResolvedTimestamp {
            date: DateStamp::Unknown,
            time: None,
            source: DateSource::Fallback,
        };
        assert_eq!(caption(&unknown, Some("Garden")), "Garden");
    }
}
