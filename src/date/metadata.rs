//! Timestamp extraction from collaborator-provided metadata maps

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Timestamp fields to try, in priority order. Original-capture fields
/// take precedence over digitized/created fields; `creation_time` covers
/// video container tags.
const DATE_KEYS: &[&str] = &[
    "SubSecDateTimeOriginal",
    "DateTimeOriginal",
    "SubSecCreateDate",
    "DateTimeDigitized",
    "CreateDate",
    "DateTime",
    "creation_time",
];

/// Pick the best timestamp out of a tag-name -> value map.
///
/// Malformed values are skipped, not errors; the next field in priority
/// order gets its chance.
pub fn extract_metadata_datetime(metadata: &BTreeMap<String, String>) -> Option<NaiveDateTime> {
    DATE_KEYS
        .iter()
        .filter_map(|key| metadata.get(*key))
        .find_map(|value| parse_metadata_datetime(value))
}

/// Parse a metadata timestamp string.
///
/// Accepts the EXIF form with or without sub-second precision, plus the
/// ISO-8601 variants video containers use (trailing Z or offset dropped).
pub fn parse_metadata_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');

    const FORMATS: &[&str] = &[
        "%Y:%m:%d %H:%M:%S%.f",
        "%Y:%m:%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];

    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    // ISO strings with a timezone tail: keep the wall-clock part
    if s.len() > 19
        && let Some(head) = s.get(..19)
        && let Ok(dt) = NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S")
    {
        return Some(dt);
    }

    None
}
