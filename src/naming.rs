//! The canonical filename grammar, in both directions
//!
//! Canonical names have the shape
//! `{date}(_{time})?(_{suffix})?(_{index})?.{ext}` where `date` is
//! `YYYYMMDD`, `YYYYMM`, or `YYYY`, `time` is `HHMMSS` (always present for
//! digital renames, absent for film batches), `suffix` is a lower-cased
//! underscore-joined label, and `index` is a 1-based collision
//! disambiguator. The builder and the parser live together so the
//! round-trip stays in one place.

use crate::date::{DateStamp, ResolvedTimestamp};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static CANONICAL: OnceLock<Regex> = OnceLock::new();

fn canonical_pattern() -> &'static Regex {
    CANONICAL.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:(\d{8})(?:_(\d{6}))?|(\d{6})|(\d{4}))(?:_([a-z0-9_]+?))?(?:_(\d+))?\.([a-z0-9]+)$",
        )
        .unwrap()
    })
}

/// Collapse whitespace to single underscores and lower-case, the way
/// suffixes are stored inside canonical names. Empty input means no
/// suffix.
pub fn normalize_suffix(raw: &str) -> Option<String> {
    let joined = raw.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        None
    } else {
        Some(joined.to_lowercase())
    }
}

/// Base name for one digitally-captured file: `{date}_{time}` plus the
/// optional suffix. The time part is always present, `000000` when no
/// source provided one.
pub fn base_name(resolved: &ResolvedTimestamp, suffix: Option<&str>) -> String {
    let mut base = format!(
        "{}_{}",
        resolved.date_component(),
        resolved.time_component()
    );
    if let Some(suffix) = suffix {
        base.push('_');
        base.push_str(suffix);
    }
    base
}

/// Base name shared by every file of a film-roll batch: the date exactly
/// as the user typed it, plus the optional suffix. No time part.
pub fn film_base_name(date_literal: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{}_{}", date_literal, suffix),
        None => date_literal.to_string(),
    }
}

/// Attach the collision index and extension to a base name.
pub fn indexed_name(base: &str, index: Option<usize>, ext: &str) -> String {
    match index {
        Some(i) => format!("{}_{}.{}", base, i, ext),
        None => format!("{}.{}", base, ext),
    }
}

/// Secondary safety net for names already taken on disk by unrelated
/// files: bump a numeric disambiguator until the path is free.
pub fn resolve_disk_conflict(mut path: PathBuf) -> Option<PathBuf> {
    if !path.exists() {
        return Some(path);
    }

    let stem = path.file_stem().and_then(|s| s.to_str())?.to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let parent = path.parent().map(|p| p.to_path_buf()).unwrap_or_default();

    for i in 1..10000 {
        let candidate = format!("{}_{}{}", stem, i, extension);
        path = parent.join(candidate);
        if !path.exists() {
            return Some(path);
        }
    }

    None
}

/// A canonical filename taken apart again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub date: DateStamp,
    pub time: Option<NaiveTime>,
    /// Free-text tokens between the timestamp and the trailing index,
    /// split on underscores; normalization into a display label is the
    /// classifier's business
    pub suffix_tokens: Vec<String>,
    /// Trailing collision index, when one was distinguishable
    pub index: Option<u32>,
    pub extension: String,
}

impl ParsedName {
    /// Calendar date used for ordering and grouping; partial stamps clamp
    /// to the first day of the month/year.
    pub fn sort_date(&self) -> NaiveDate {
        match self.date {
            DateStamp::Day(d) => d,
            DateStamp::Month { year, month } => {
                NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
            }
            DateStamp::Year(year) => NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default(),
            // Parsing never produces these
            DateStamp::Literal(_) | DateStamp::Unknown => NaiveDate::default(),
        }
    }
}

/// Parse a file name against the canonical grammar. Returns `None` for
/// nonconforming names, including digit runs that are not valid dates.
pub fn parse_canonical(name: &str) -> Option<ParsedName> {
    let caps = canonical_pattern().captures(name)?;

    let date = if let Some(full) = caps.get(1) {
        let s = full.as_str();
        let year: i32 = s[..4].parse().ok()?;
        let month: u32 = s[4..6].parse().ok()?;
        let day: u32 = s[6..8].parse().ok()?;
        DateStamp::Day(NaiveDate::from_ymd_opt(year, month, day)?)
    } else if let Some(ym) = caps.get(3) {
        let s = ym.as_str();
        let year: i32 = s[..4].parse().ok()?;
        let month: u32 = s[4..].parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        DateStamp::Month { year, month }
    } else {
        let year: i32 = caps.get(4)?.as_str().parse().ok()?;
        DateStamp::Year(year)
    };

    let time = match caps.get(2) {
        Some(t) => {
            let s = t.as_str();
            let hour: u32 = s[..2].parse().ok()?;
            let minute: u32 = s[2..4].parse().ok()?;
            let second: u32 = s[4..].parse().ok()?;
            Some(NaiveTime::from_hms_opt(hour, minute, second)?)
        }
        None => None,
    };

    let suffix_tokens = caps
        .get(5)
        .map(|m| {
            m.as_str()
                .split('_')
                .filter(|t| !t.is_empty())
                .map(|t| t.to_lowercase())
                .collect()
        })
        .unwrap_or_default();

    let index = caps.get(6).and_then(|m| m.as_str().parse().ok());

    Some(ParsedName {
        date,
        time,
        suffix_tokens,
        index,
        extension: caps[7].to_lowercase(),
    })
}

/// Parse the file-name component of a path.
pub fn parse_canonical_path(path: &Path) -> Option<ParsedName> {
    parse_canonical(path.file_name()?.to_str()?)
}
