//! Folder classification for library restructuring
//!
//! Parses canonical filenames back into dated entries, groups them by
//! suffix label, partitions each group at large date gaps, and decides
//! between event-named and month-named destination folders.
//!
//! Gap handling is split in two: `detect_gaps` is pure and reports where
//! decisions are needed; `partition` applies caller-supplied decisions.
//! The interactive layer owns the prompting.

use crate::date::{decade_label, month_name};
use crate::media::MediaFile;
use crate::naming::{self, ParsedName};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// One file with its parsed canonical-name identity
#[derive(Debug, Clone)]
pub struct ParsedEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub date: NaiveDate,
    /// Normalized display label ("Italy 2024"), `None` for files without
    /// a real suffix
    pub label: Option<String>,
}

/// All files sharing one suffix label, sorted by date.
///
/// Files without a suffix are bucketed by (year, month) instead, one
/// group per pair.
#[derive(Debug, Clone)]
pub struct SuffixGroup {
    pub label: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

/// A year gap inside a suffix group that needs a merge-or-split decision
#[derive(Debug, Clone)]
pub struct Gap {
    /// Index into the group's entries of the file before the gap
    pub prev_index: usize,
    pub prev_name: String,
    pub prev_date: NaiveDate,
    pub next_name: String,
    pub next_date: NaiveDate,
}

/// Caller-supplied answer for one detected gap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapDecision {
    /// Keep both sides in the same folder
    Merge,
    /// Start a new folder at the gap
    Split,
}

/// A maximal run of same-suffix files destined for one folder
#[derive(Debug, Clone)]
pub struct EventPartition {
    pub entries: Vec<ParsedEntry>,
    /// Earliest date in the partition; names the folder
    pub earliest: NaiveDate,
}

/// Split a scanned file set into parsed entries and nonconforming paths.
///
/// Restructuring refuses to proceed while the second list is non-empty;
/// that check belongs to the caller so it can report every offender.
pub fn partition_conforming(files: &[MediaFile]) -> (Vec<ParsedEntry>, Vec<PathBuf>) {
    let mut parsed = Vec::new();
    let mut nonconforming = Vec::new();

    for file in files {
        match naming::parse_canonical_path(&file.path) {
            Some(name) => parsed.push(to_entry(file, &name)),
            None => nonconforming.push(file.path.clone()),
        }
    }

    (parsed, nonconforming)
}

fn to_entry(file: &MediaFile, name: &ParsedName) -> ParsedEntry {
    ParsedEntry {
        path: file.path.clone(),
        file_name: file.file_name(),
        date: name.sort_date(),
        label: normalize_label(&name.suffix_tokens),
    }
}

/// Turn parsed suffix tokens into a display label.
///
/// - a single numeric token was only a collision index: no label
/// - an all-numeric token run is likewise treated as no label
/// - a trailing number after a word reads as a year-style event name:
///   "italy 2024" becomes "Italy 2024"
/// - anything else joins into one capitalized label
pub fn normalize_label(tokens: &[String]) -> Option<String> {
    if tokens.is_empty() {
        return None;
    }

    let numeric = |t: &String| t.chars().all(|c| c.is_ascii_digit());

    if tokens.iter().all(numeric) {
        return None;
    }

    if tokens.len() >= 2 {
        let last = &tokens[tokens.len() - 1];
        let prev = &tokens[tokens.len() - 2];
        if numeric(last) && !numeric(prev) {
            let head = tokens[..tokens.len() - 1].join(" ");
            return Some(format!("{} {}", capitalize(&head), last));
        }
    }

    Some(capitalize(&tokens.join(" ")))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Group entries by suffix label. Unlabelled entries form one group per
/// (year, month) pair; labelled groups are sorted by date ascending.
pub fn group_by_suffix(entries: Vec<ParsedEntry>) -> Vec<SuffixGroup> {
    let mut labelled: BTreeMap<String, Vec<ParsedEntry>> = BTreeMap::new();
    let mut monthly: BTreeMap<(i32, u32), Vec<ParsedEntry>> = BTreeMap::new();

    for entry in entries {
        match entry.label.clone() {
            Some(label) => labelled.entry(label).or_default().push(entry),
            None => monthly
                .entry((entry.date.year(), entry.date.month()))
                .or_default()
                .push(entry),
        }
    }

    let mut groups = Vec::new();
    for (label, mut entries) in labelled {
        entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.path.cmp(&b.path)));
        groups.push(SuffixGroup {
            label: Some(label),
            entries,
        });
    }
    for (_, mut entries) in monthly {
        entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.path.cmp(&b.path)));
        groups.push(SuffixGroup { label: None, entries });
    }

    debug!(groups = groups.len(), "Grouped entries by suffix");
    groups
}

/// Find the places where consecutive dates in a group differ by more than
/// one year. Pure; no decisions are made here.
pub fn detect_gaps(group: &SuffixGroup) -> Vec<Gap> {
    group
        .entries
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1].date.year() - pair[0].date.year() > 1)
        .map(|(i, pair)| Gap {
            prev_index: i,
            prev_name: pair[0].file_name.clone(),
            prev_date: pair[0].date,
            next_name: pair[1].file_name.clone(),
            next_date: pair[1].date,
        })
        .collect()
}

/// Partition a group into event folders, applying one decision per
/// detected gap (in the order `detect_gaps` reported them). A `Split`
/// closes the open partition at the gap; a `Merge` keeps accumulating
/// into it.
pub fn partition(group: &SuffixGroup, decisions: &[GapDecision]) -> Vec<EventPartition> {
    if group.entries.is_empty() {
        return Vec::new();
    }

    let mut partitions = Vec::new();
    let mut current = vec![group.entries[0].clone()];
    let mut decision_cursor = 0;

    for pair in group.entries.windows(2) {
        let gap = pair[1].date.year() - pair[0].date.year() > 1;
        let split = if gap {
            let decision = decisions
                .get(decision_cursor)
                .copied()
                .unwrap_or(GapDecision::Split);
            decision_cursor += 1;
            decision == GapDecision::Split
        } else {
            false
        };

        if split {
            partitions.push(close(current));
            current = vec![pair[1].clone()];
        } else {
            current.push(pair[1].clone());
        }
    }
    partitions.push(close(current));

    partitions
}

fn close(entries: Vec<ParsedEntry>) -> EventPartition {
    let earliest = entries
        .iter()
        .map(|e| e.date)
        .min()
        .unwrap_or_default();
    EventPartition { entries, earliest }
}

/// Decide the destination folder for one partition, relative to the
/// library root.
///
/// A labelled partition earns an event folder only when the label's
/// global count (across all partitions of the suffix) meets the
/// threshold; otherwise it falls back to the month folder of its
/// earliest date, as unlabelled partitions always do.
pub fn target_folder(
    label: Option<&str>,
    global_count: usize,
    threshold: usize,
    partition: &EventPartition,
) -> PathBuf {
    let year = partition.earliest.year();
    let mut path = PathBuf::from(decade_label(year));
    path.push(year.to_string());

    match label {
        Some(label) if global_count >= threshold => path.push(label),
        _ => {
            let month = partition.earliest.month();
            path.push(format!("{}. {}", month, month_name(month)));
        }
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, date: (i32, u32, u32), label: Option<&str>) -> ParsedEntry {
        ParsedEntry {
            path: PathBuf::from(format!("/lib/{name}")),
            file_name: name.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            label: label.map(|s| s.to_string()),
        }
    }

    fn group(label: Option<&str>, entries: Vec<ParsedEntry>) -> SuffixGroup {
        SuffixGroup {
            label: label.map(|s| s.to_string()),
            entries,
        }
    }

    #[test]
    fn test_normalize_label_rules() {
        let tokens = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(normalize_label(&tokens(&[])), None);
        assert_eq!(normalize_label(&tokens(&["3"])), None);
        assert_eq!(normalize_label(&tokens(&["2024", "3"])), None);
        assert_eq!(normalize_label(&tokens(&["italy"])), Some("Italy".into()));
        assert_eq!(
            normalize_label(&tokens(&["italy", "2024"])),
            Some("Italy 2024".into())
        );
        assert_eq!(
            normalize_label(&tokens(&["lake", "district"])),
            Some("Lake district".into())
        );
    }

    #[test]
    fn test_group_routing() {
        let entries = vec![
            entry("20230115_100000_italy_1.jpg", (2023, 1, 15), Some("Italy")),
            entry("20230116_100000_italy_2.jpg", (2023, 1, 16), Some("Italy")),
            entry("20230201_100000.jpg", (2023, 2, 1), None),
            entry("20230202_100000.jpg", (2023, 2, 2), None),
            entry("20240301_100000.jpg", (2024, 3, 1), None),
        ];

        let groups = group_by_suffix(entries);
        assert_eq!(groups.len(), 3);

        let italy = groups.iter().find(|g| g.label.is_some()).unwrap();
        assert_eq!(italy.entries.len(), 2);

        // Unlabelled files split per (year, month), not into one bucket
        let monthly: Vec<_> = groups.iter().filter(|g| g.label.is_none()).collect();
        assert_eq!(monthly.len(), 2);
    }

    #[test]
    fn test_detect_gaps() {
        let g = group(
            Some("Skiing"),
            vec![
                entry("a.jpg", (2018, 2, 1), Some("Skiing")),
                entry("b.jpg", (2019, 1, 20), Some("Skiing")),
                entry("c.jpg", (2023, 2, 5), Some("Skiing")),
            ],
        );

        let gaps = detect_gaps(&g);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].prev_index, 1);
        assert_eq!(gaps[0].prev_date.year(), 2019);
        assert_eq!(gaps[0].next_date.year(), 2023);
    }

    #[test]
    fn test_partition_split_and_merge() {
        let g = group(
            Some("Skiing"),
            vec![
                entry("a.jpg", (2018, 2, 1), Some("Skiing")),
                entry("b.jpg", (2023, 2, 5), Some("Skiing")),
                entry("c.jpg", (2023, 2, 6), Some("Skiing")),
            ],
        );

        let split = partition(&g, &[GapDecision::Split]);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].entries.len(), 1);
        assert_eq!(split[1].entries.len(), 2);
        assert_eq!(split[1].earliest, NaiveDate::from_ymd_opt(2023, 2, 5).unwrap());

        let merged = partition(&g, &[GapDecision::Merge]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].entries.len(), 3);
        assert_eq!(merged[0].earliest, NaiveDate::from_ymd_opt(2018, 2, 1).unwrap());
    }

    #[test]
    fn test_partition_sequential_decisions() {
        // Two gaps: 2010 -> 2015 -> 2020. Merging the first but splitting
        // the second must keep 2010+2015 together.
        let g = group(
            Some("Reunion"),
            vec![
                entry("a.jpg", (2010, 6, 1), Some("Reunion")),
                entry("b.jpg", (2015, 6, 1), Some("Reunion")),
                entry("c.jpg", (2020, 6, 1), Some("Reunion")),
            ],
        );

        let parts = partition(&g, &[GapDecision::Merge, GapDecision::Split]);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].entries.len(), 2);
        assert_eq!(parts[0].earliest.year(), 2010);
        assert_eq!(parts[1].earliest.year(), 2020);
    }

    #[test]
    fn test_adjacent_years_never_gap() {
        let g = group(
            Some("Nye"),
            vec![
                entry("a.jpg", (2022, 12, 31), Some("Nye")),
                entry("b.jpg", (2023, 1, 1), Some("Nye")),
            ],
        );
        assert!(detect_gaps(&g).is_empty());
        assert_eq!(partition(&g, &[]).len(), 1);
    }

    #[test]
    fn test_target_folder_threshold() {
        let part = EventPartition {
            entries: vec![entry("a.jpg", (2023, 1, 15), Some("Italy"))],
            earliest: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
        };

        // Below threshold: month folder, not an event folder
        assert_eq!(
            target_folder(Some("Italy"), 6, 10, &part),
            PathBuf::from("2020s/2023/1. January")
        );
        // At threshold: event folder
        assert_eq!(
            target_folder(Some("Italy"), 10, 10, &part),
            PathBuf::from("2020s/2023/Italy")
        );
        // Unlabelled: always month folder
        assert_eq!(
            target_folder(None, 100, 10, &part),
            PathBuf::from("2020s/2023/1. January")
        );
    }

    #[test]
    fn test_nonconforming_detection() {
        use crate::config::{CategoryFilter, Config};
        use crate::media::MediaFile;
        use std::fs::File;
        use tempfile::tempdir;

        let tmp = tempdir().unwrap();
        for name in ["20230115_100000.jpg", "photo.jpg"] {
            File::create(tmp.path().join(name)).unwrap();
        }
        let config = Config::default();
        let files: Vec<MediaFile> = ["20230115_100000.jpg", "photo.jpg"]
            .iter()
            .filter_map(|n| {
                MediaFile::from_path(&tmp.path().join(n), &config, CategoryFilter::all())
            })
            .collect();

        let (parsed, nonconforming) = partition_conforming(&files);
        assert_eq!(parsed.len(), 1);
        assert_eq!(nonconforming.len(), 1);
        assert!(nonconforming[0].ends_with("photo.jpg"));
    }
}
