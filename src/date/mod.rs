//! Capture-date resolution
//!
//! Derives one canonical timestamp per media file from a prioritized set
//! of unreliable signals:
//! - embedded metadata timestamps (EXIF / container tags)
//! - timestamps embedded in the filename
//! - filesystem modify/create times
//! - a sentinel when nothing else is available
//!
//! A user-supplied override date, when present, replaces the date portion
//! while the time portion is still taken from the best available signal.

pub mod filename;
pub mod metadata;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::SystemTime;
use tracing::trace;

use crate::media::MediaFile;

/// Source of the resolved date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    /// User-supplied override date
    Override,
    /// Embedded metadata timestamp
    Metadata,
    /// Parsed from filename
    Filename,
    /// Filesystem modify/create time
    FileSystem,
    /// Nothing available; sentinel components
    Fallback,
}

/// How much of the resolved timestamp is trustworthy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Second,
    Day,
    Month,
    Year,
}

/// The date portion of a resolved timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateStamp {
    /// Full calendar date
    Day(NaiveDate),
    /// Year and month only (film-roll batches)
    Month { year: i32, month: u32 },
    /// Year only
    Year(i32),
    /// Malformed user override, carried verbatim into the name
    Literal(String),
    /// No signal at all; renders the sentinel
    Unknown,
}

/// Result of date resolution, produced once per file and never mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTimestamp {
    pub date: DateStamp,
    pub time: Option<NaiveTime>,
    pub source: DateSource,
}

impl ResolvedTimestamp {
    pub fn precision(&self) -> Precision {
        match (&self.date, self.time) {
            (DateStamp::Day(_), Some(_)) => Precision::Second,
            (DateStamp::Day(_), None) => Precision::Day,
            (DateStamp::Month { .. }, _) => Precision::Month,
            _ => Precision::Year,
        }
    }

    /// Date component of the canonical name: `YYYYMMDD`, `YYYYMM`,
    /// `YYYY`, a verbatim override, or the `00000000` sentinel.
    pub fn date_component(&self) -> String {
        match &self.date {
            DateStamp::Day(d) => d.format("%Y%m%d").to_string(),
            DateStamp::Month { year, month } => format!("{:04}{:02}", year, month),
            DateStamp::Year(year) => format!("{:04}", year),
            DateStamp::Literal(raw) => raw.clone(),
            DateStamp::Unknown => "00000000".to_string(),
        }
    }

    /// Time component of the canonical name, `000000` when no source
    /// provided one.
    pub fn time_component(&self) -> String {
        self.time
            .map(|t| format!("{:02}{:02}{:02}", t.hour(), t.minute(), t.second()))
            .unwrap_or_else(|| "000000".to_string())
    }

    /// Best-effort concrete datetime for display purposes. Partial stamps
    /// clamp to the first day/month; literal and unknown stamps have none.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        let date = match &self.date {
            DateStamp::Day(d) => *d,
            DateStamp::Month { year, month } => NaiveDate::from_ymd_opt(*year, *month, 1)?,
            DateStamp::Year(year) => NaiveDate::from_ymd_opt(*year, 1, 1)?,
            DateStamp::Literal(_) | DateStamp::Unknown => return None,
        };
        Some(date.and_time(self.time.unwrap_or_default()))
    }
}

/// Everything the resolver is allowed to look at for one file.
///
/// Filesystem times are carried in the request rather than read here so
/// the resolution logic stays free of I/O.
#[derive(Debug, Clone)]
pub struct ResolveRequest<'a> {
    pub file_name: &'a str,
    pub metadata: &'a BTreeMap<String, String>,
    pub override_date: Option<&'a str>,
    pub modified: Option<SystemTime>,
    pub created: Option<SystemTime>,
}

impl<'a> ResolveRequest<'a> {
    pub fn for_file(
        file: &'a MediaFile,
        metadata: &'a BTreeMap<String, String>,
        override_date: Option<&'a str>,
    ) -> Self {
        Self {
            file_name: file
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default(),
            metadata,
            override_date,
            modified: file.modified,
            created: file.created,
        }
    }

    pub fn for_path(
        path: &'a Path,
        metadata: &'a BTreeMap<String, String>,
        override_date: Option<&'a str>,
    ) -> Self {
        let meta = std::fs::metadata(path).ok();
        Self {
            file_name: path.file_name().and_then(|n| n.to_str()).unwrap_or_default(),
            metadata,
            override_date,
            modified: meta.as_ref().and_then(|m| m.modified().ok()),
            created: meta.as_ref().and_then(|m| m.created().ok()),
        }
    }
}

type Strategy = fn(&ResolveRequest) -> Option<ResolvedTimestamp>;

/// Resolution strategies, tried in order; the first non-empty result wins.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("metadata", from_metadata),
    ("filename", from_filename),
    ("filesystem", from_filesystem),
];

/// Resolve the canonical timestamp for one file.
pub fn resolve(req: &ResolveRequest) -> ResolvedTimestamp {
    let base = STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let result = strategy(req);
            if result.is_some() {
                trace!(file = req.file_name, strategy = name, "Date resolved");
            }
            result
        })
        .unwrap_or(ResolvedTimestamp {
            date: DateStamp::Unknown,
            time: None,
            source: DateSource::Fallback,
        });

    match req.override_date {
        Some(raw) => ResolvedTimestamp {
            date: parse_override(raw),
            time: base.time,
            source: DateSource::Override,
        },
        None => base,
    }
}

/// Parse a user override date. Malformed input degrades to a literal
/// stamp used verbatim in the name rather than failing the file.
pub fn parse_override(raw: &str) -> DateStamp {
    let raw = raw.trim();
    if raw.len() == 8 && raw.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y%m%d") {
            return DateStamp::Day(date);
        }
    } else if raw.len() == 6 && raw.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = raw[..4].parse().unwrap_or(0);
        let month: u32 = raw[4..].parse().unwrap_or(0);
        if (1..=12).contains(&month) {
            return DateStamp::Month { year, month };
        }
    } else if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(year) = raw.parse() {
            return DateStamp::Year(year);
        }
    }
    DateStamp::Literal(raw.to_string())
}

fn from_metadata(req: &ResolveRequest) -> Option<ResolvedTimestamp> {
    let dt = metadata::extract_metadata_datetime(req.metadata)?;
    Some(ResolvedTimestamp {
        date: DateStamp::Day(dt.date()),
        time: Some(dt.time()),
        source: DateSource::Metadata,
    })
}

fn from_filename(req: &ResolveRequest) -> Option<ResolvedTimestamp> {
    match filename::parse_filename_timestamp(req.file_name)? {
        filename::FilenameStamp::Full(dt) => Some(ResolvedTimestamp {
            date: DateStamp::Day(dt.date()),
            time: Some(dt.time()),
            source: DateSource::Filename,
        }),
        // A date-only match still borrows its time of day from the file
        // modify time when one exists; the date remains authoritative.
        filename::FilenameStamp::DateOnly(date) => Some(ResolvedTimestamp {
            date: DateStamp::Day(date),
            time: req.modified.map(|st| system_time_to_naive(st).time()),
            source: DateSource::Filename,
        }),
    }
}

fn from_filesystem(req: &ResolveRequest) -> Option<ResolvedTimestamp> {
    let st = req.modified.or(req.created)?;
    let dt = system_time_to_naive(st);
    Some(ResolvedTimestamp {
        date: DateStamp::Day(dt.date()),
        time: Some(dt.time()),
        source: DateSource::FileSystem,
    })
}

fn system_time_to_naive(st: SystemTime) -> NaiveDateTime {
    let dt: DateTime<Local> = st.into();
    dt.naive_local()
}

/// Decade segment for a year, e.g. 2023 -> "2020s"
pub fn decade_label(year: i32) -> String {
    format!("{}s", (year / 10) * 10)
}

/// English month name for a 1-based month number
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}
