//! Batch renaming into canonical timestamp names
//!
//! Builds a full preview of (old, new) pairs before touching anything;
//! the interactive layer shows the preview and asks for confirmation.
//! Individual rename failures are reported and skipped, never fatal to
//! the batch.

use crate::config::{CategoryFilter, Config};
use crate::date::{self, DateStamp, ResolveRequest};
use crate::error::Result;
use crate::media::{self, MediaFile};
use crate::metadata::MetadataProvider;
use crate::naming;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// One planned rename; the target stays in the source's directory
#[derive(Debug, Clone)]
pub struct RenameEntry {
    pub source: PathBuf,
    pub target_name: String,
}

impl RenameEntry {
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn target_path(&self) -> PathBuf {
        match self.source.parent() {
            Some(parent) => parent.join(&self.target_name),
            None => PathBuf::from(&self.target_name),
        }
    }
}

/// The full preview for one batch
#[derive(Debug, Default)]
pub struct RenamePlan {
    pub entries: Vec<RenameEntry>,
    /// Files already carrying their canonical name, left alone
    pub unchanged: usize,
}

/// Outcome of applying a plan
#[derive(Debug, Default)]
pub struct RenameReport {
    pub renamed: usize,
    pub failed: Vec<(PathBuf, String)>,
}

/// Options for the digital (per-file timestamp) rename flow
#[derive(Debug, Clone, Default)]
pub struct DigitalOptions {
    pub recursive: bool,
    pub include_raw: bool,
    pub include_video: bool,
    /// Free-text suffix, normalized before use
    pub suffix: Option<String>,
    /// Optional override date (YYYYMMDD, YYYYMM, or YYYY)
    pub override_date: Option<String>,
}

/// Options for the film (shared batch date) rename flow
#[derive(Debug, Clone)]
pub struct FilmOptions {
    pub recursive: bool,
    pub include_raw: bool,
    /// Batch date exactly as the user typed it
    pub date_literal: String,
    pub suffix: Option<String>,
}

/// Whether a film batch date is acceptable (YYYYMMDD, YYYYMM, or YYYY
/// with valid calendar values).
pub fn is_valid_batch_date(input: &str) -> bool {
    !matches!(date::parse_override(input), DateStamp::Literal(_))
}

/// Plan a digital rename: resolve each file's timestamp, group files by
/// base name, and index collisions in sorted-path order.
pub fn plan_digital(
    dir: &Path,
    config: &Config,
    options: &DigitalOptions,
    provider: &dyn MetadataProvider,
) -> Result<RenamePlan> {
    let filter = CategoryFilter {
        images: true,
        raw: options.include_raw,
        video: options.include_video,
    };
    let files = media::scan_directory(dir, config, filter, options.recursive)?;
    let suffix = options.suffix.as_deref().and_then(naming::normalize_suffix);

    // Scan order is sorted by path, so each group's vec stays in
    // sorted-path order for stable index assignment
    let mut groups: BTreeMap<String, Vec<MediaFile>> = BTreeMap::new();
    for file in files {
        let metadata = provider.read(&file);
        let request =
            ResolveRequest::for_file(&file, &metadata, options.override_date.as_deref());
        let resolved = date::resolve(&request);
        let base = naming::base_name(&resolved, suffix.as_deref());
        groups.entry(base).or_default().push(file);
    }

    Ok(plan_from_groups(groups))
}

/// Plan a film rename: one shared base date for the whole batch, every
/// file indexed when the batch holds more than one.
pub fn plan_film(dir: &Path, config: &Config, options: &FilmOptions) -> Result<RenamePlan> {
    let filter = CategoryFilter {
        images: true,
        raw: options.include_raw,
        video: false,
    };
    let files = media::scan_directory(dir, config, filter, options.recursive)?;
    let suffix = options.suffix.as_deref().and_then(naming::normalize_suffix);
    let base = naming::film_base_name(&options.date_literal, suffix.as_deref());

    let mut groups = BTreeMap::new();
    groups.insert(base, files);
    Ok(plan_from_groups(groups))
}

fn plan_from_groups(groups: BTreeMap<String, Vec<MediaFile>>) -> RenamePlan {
    let mut plan = RenamePlan::default();

    for (base, members) in groups {
        let many = members.len() > 1;
        for (i, file) in members.iter().enumerate() {
            let index = if many { Some(i + 1) } else { None };
            let target_name = naming::indexed_name(&base, index, &file.extension);
            if file.file_name() == target_name {
                plan.unchanged += 1;
                continue;
            }
            plan.entries.push(RenameEntry {
                source: file.path.clone(),
                target_name,
            });
        }
    }

    plan
}

/// Apply a plan, one rename at a time. A target name already taken on
/// disk gets a bumped disambiguator rather than clobbering the occupant.
pub fn apply(plan: &RenamePlan) -> RenameReport {
    let mut report = RenameReport::default();

    for entry in &plan.entries {
        let target = entry.target_path();
        let target = if target.exists() {
            match naming::resolve_disk_conflict(target) {
                Some(free) => free,
                None => {
                    error!(source = %entry.source.display(), "No free name for rename target");
                    report.failed.push((
                        entry.source.clone(),
                        "no free disambiguated name".to_string(),
                    ));
                    continue;
                }
            }
        } else {
            target
        };

        match fs::rename(&entry.source, &target) {
            Ok(()) => {
                info!(source = %entry.source.display(), target = %target.display(), "Renamed");
                report.renamed += 1;
            }
            Err(e) => {
                error!(source = %entry.source.display(), error = %e, "Rename failed");
                report.failed.push((entry.source.clone(), e.to_string()));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;
    use std::fs::File;
    use tempfile::tempdir;

    struct StubProvider(Map<String, Map<String, String>>);

    impl MetadataProvider for StubProvider {
        fn read(&self, file: &MediaFile) -> Map<String, String> {
            self.0.get(&file.file_name()).cloned().unwrap_or_default()
        }
    }

    fn exif(date: &str) -> Map<String, String> {
        let mut m = Map::new();
        m.insert("DateTimeOriginal".to_string(), date.to_string());
        m
    }

    #[test]
    fn test_digital_plan_indexes_shared_base_in_path_order() {
        let tmp = tempdir().unwrap();
        for name in ["a.jpg", "b.jpg"] {
            File::create(tmp.path().join(name)).unwrap();
        }

        let mut meta = Map::new();
        meta.insert("a.jpg".to_string(), exif("2023:01:01 12:00:00"));
        meta.insert("b.jpg".to_string(), exif("2023:01:01 12:00:00"));
        let provider = StubProvider(meta);

        let plan = plan_digital(
            tmp.path(),
            &Config::default(),
            &DigitalOptions::default(),
            &provider,
        )
        .unwrap();

        let names: Vec<_> = plan.entries.iter().map(|e| e.target_name.clone()).collect();
        assert_eq!(names, vec!["20230101_120000_1.jpg", "20230101_120000_2.jpg"]);
        let sources: Vec<_> = plan.entries.iter().map(|e| e.source_name()).collect();
        assert_eq!(sources, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_digital_plan_lone_file_unindexed() {
        let tmp = tempdir().unwrap();
        File::create(tmp.path().join("a.jpg")).unwrap();

        let mut meta = Map::new();
        meta.insert("a.jpg".to_string(), exif("2023:01:01 12:00:00"));
        let provider = StubProvider(meta);

        let plan = plan_digital(
            tmp.path(),
            &Config::default(),
            &DigitalOptions::default(),
            &provider,
        )
        .unwrap();

        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries[0].target_name, "20230101_120000.jpg");
    }

    #[test]
    fn test_digital_plan_skips_already_canonical() {
        let tmp = tempdir().unwrap();
        File::create(tmp.path().join("20230101_120000.jpg")).unwrap();

        let mut meta = Map::new();
        meta.insert("20230101_120000.jpg".to_string(), exif("2023:01:01 12:00:00"));
        let provider = StubProvider(meta);

        let plan = plan_digital(
            tmp.path(),
            &Config::default(),
            &DigitalOptions::default(),
            &provider,
        )
        .unwrap();

        assert!(plan.entries.is_empty());
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn test_digital_plan_with_suffix_and_override() {
        let tmp = tempdir().unwrap();
        File::create(tmp.path().join("a.jpg")).unwrap();

        let mut meta = Map::new();
        meta.insert("a.jpg".to_string(), exif("2023:01:01 12:00:00"));
        let provider = StubProvider(meta);

        let options = DigitalOptions {
            suffix: Some("Lake District".to_string()),
            override_date: Some("19990830".to_string()),
            ..Default::default()
        };
        let plan = plan_digital(tmp.path(), &Config::default(), &options, &provider).unwrap();

        assert_eq!(plan.entries[0].target_name, "19990830_120000_lake_district.jpg");
    }

    #[test]
    fn test_film_plan_every_file_indexed() {
        let tmp = tempdir().unwrap();
        for name in ["x.jpg", "y.jpg", "z.jpg"] {
            File::create(tmp.path().join(name)).unwrap();
        }

        let options = FilmOptions {
            recursive: false,
            include_raw: false,
            date_literal: "197406".to_string(),
            suffix: Some("wedding".to_string()),
        };
        let plan = plan_film(tmp.path(), &Config::default(), &options).unwrap();

        let names: Vec<_> = plan.entries.iter().map(|e| e.target_name.clone()).collect();
        assert_eq!(
            names,
            vec!["197406_wedding_1.jpg", "197406_wedding_2.jpg", "197406_wedding_3.jpg"]
        );
    }

    #[test]
    fn test_film_plan_single_file_unindexed() {
        let tmp = tempdir().unwrap();
        File::create(tmp.path().join("x.jpg")).unwrap();

        let options = FilmOptions {
            recursive: false,
            include_raw: false,
            date_literal: "1974".to_string(),
            suffix: None,
        };
        let plan = plan_film(tmp.path(), &Config::default(), &options).unwrap();

        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries[0].target_name, "1974.jpg");
    }

    #[test]
    fn test_batch_date_validation() {
        assert!(is_valid_batch_date("19740615"));
        assert!(is_valid_batch_date("197406"));
        assert!(is_valid_batch_date("1974"));
        assert!(!is_valid_batch_date("197413")); // month 13
        assert!(!is_valid_batch_date("74"));
        assert!(!is_valid_batch_date("june 1974"));
    }

    #[test]
    fn test_apply_renames_and_reports() {
        let tmp = tempdir().unwrap();
        for name in ["a.jpg", "b.jpg"] {
            File::create(tmp.path().join(name)).unwrap();
        }

        let plan = RenamePlan {
            entries: vec![
                RenameEntry {
                    source: tmp.path().join("a.jpg"),
                    target_name: "20230101_120000_1.jpg".to_string(),
                },
                RenameEntry {
                    source: tmp.path().join("missing.jpg"),
                    target_name: "20230101_120000_2.jpg".to_string(),
                },
                RenameEntry {
                    source: tmp.path().join("b.jpg"),
                    target_name: "20230101_120000_3.jpg".to_string(),
                },
            ],
            unchanged: 0,
        };

        let report = apply(&plan);
        // The missing file fails but the batch continues
        assert_eq!(report.renamed, 2);
        assert_eq!(report.failed.len(), 1);
        assert!(tmp.path().join("20230101_120000_1.jpg").exists());
        assert!(tmp.path().join("20230101_120000_3.jpg").exists());
    }

    #[test]
    fn test_apply_bumps_existing_target() {
        let tmp = tempdir().unwrap();
        File::create(tmp.path().join("a.jpg")).unwrap();
        File::create(tmp.path().join("20230101_120000.jpg")).unwrap();

        let plan = RenamePlan {
            entries: vec![RenameEntry {
                source: tmp.path().join("a.jpg"),
                target_name: "20230101_120000.jpg".to_string(),
            }],
            unchanged: 0,
        };

        let report = apply(&plan);
        assert_eq!(report.renamed, 1);
        // The occupant keeps its name; the newcomer gets a bumped one
        assert!(tmp.path().join("20230101_120000.jpg").exists());
        assert!(tmp.path().join("20230101_120000_1.jpg").exists());
    }
}
