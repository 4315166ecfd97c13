//! Restructuring a canonical-named library into a decade/year tree
//!
//! Turns the classifier's partitions into a concrete transfer plan,
//! executes it on a bounded worker pool, and prunes destination
//! directories left without any media.
//!
//! Move mode relocates files inside one root; copy mode writes into a
//! separate root whose previous contents the caller has already cleared
//! (behind its double confirmation). Each transfer is independent;
//! failures are collected, never fatal.

use crate::classify::{EventPartition, SuffixGroup};
use crate::config::Config;
use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// How files travel to their destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Same root: relocate in place
    Move,
    /// Different root: duplicate into it
    Copy,
}

/// One file transfer
#[derive(Debug, Clone)]
pub struct Transfer {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// The full transfer plan for one restructuring run
#[derive(Debug)]
pub struct TransferPlan {
    pub mode: TransferMode,
    pub dest_root: PathBuf,
    pub transfers: Vec<Transfer>,
}

/// Outcome of executing a plan
#[derive(Debug, Default)]
pub struct TransferReport {
    pub transferred: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
}

/// Build the transfer plan from classified groups and their partitions.
///
/// Destination paths are deduplicated here (first planner wins) so the
/// same destination is never written twice within one run.
pub fn build_plan(
    groups: &[(SuffixGroup, Vec<EventPartition>)],
    dest_root: &Path,
    mode: TransferMode,
    threshold: usize,
) -> TransferPlan {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut transfers = Vec::new();

    for (group, partitions) in groups {
        let global_count = group.entries.len();
        for part in partitions {
            let folder = dest_root.join(crate::classify::target_folder(
                group.label.as_deref(),
                global_count,
                threshold,
                part,
            ));
            for entry in &part.entries {
                let dest = folder.join(&entry.file_name);
                if !seen.insert(dest.clone()) {
                    debug!(dest = %dest.display(), "Duplicate destination dropped from plan");
                    continue;
                }
                if entry.path == dest {
                    debug!(path = %entry.path.display(), "Already in place");
                    continue;
                }
                transfers.push(Transfer {
                    source: entry.path.clone(),
                    dest,
                });
            }
        }
    }

    TransferPlan {
        mode,
        dest_root: dest_root.to_path_buf(),
        transfers,
    }
}

/// Execute a plan on the rayon pool.
///
/// A shared destination set guards against two tasks writing the same
/// path; everything else is per-file and independent.
pub fn execute(plan: &TransferPlan, threads: usize) -> TransferReport {
    if threads > 0 {
        // Ignored if a global pool already exists
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    let progress = ProgressBar::new(plan.transfers.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  "),
    );

    let written: Mutex<HashSet<PathBuf>> = Mutex::new(HashSet::new());
    let report = Mutex::new(TransferReport::default());

    plan.transfers.par_iter().for_each(|transfer| {
        let claimed = {
            let mut guard = written.lock().unwrap();
            guard.insert(transfer.dest.clone())
        };
        if !claimed {
            warn!(dest = %transfer.dest.display(), "Destination already written, skipping");
            report.lock().unwrap().skipped += 1;
            progress.inc(1);
            return;
        }

        match transfer_one(transfer, plan.mode) {
            Ok(()) => {
                info!(
                    source = %transfer.source.display(),
                    dest = %transfer.dest.display(),
                    "Transferred"
                );
                report.lock().unwrap().transferred += 1;
            }
            Err(e) => {
                error!(
                    source = %transfer.source.display(),
                    dest = %transfer.dest.display(),
                    error = %e,
                    "Transfer failed"
                );
                report
                    .lock()
                    .unwrap()
                    .failed
                    .push((transfer.source.clone(), e.to_string()));
            }
        }
        progress.inc(1);
    });

    progress.finish_and_clear();
    report.into_inner().unwrap()
}

fn transfer_one(transfer: &Transfer, mode: TransferMode) -> Result<()> {
    if let Some(parent) = transfer.dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let source_mtime = fs::metadata(&transfer.source)
        .and_then(|m| m.modified())
        .ok();

    match mode {
        TransferMode::Move => {
            // Rename is cheap on the same filesystem; fall back to
            // copy + delete across mounts
            if fs::rename(&transfer.source, &transfer.dest).is_err() {
                copy_file(&transfer.source, &transfer.dest)?;
                fs::remove_file(&transfer.source)?;
            }
        }
        TransferMode::Copy => {
            copy_file(&transfer.source, &transfer.dest)?;
        }
    }

    // Preserve modification time
    if let Some(mtime) = source_mtime {
        let _ = filetime::set_file_mtime(
            &transfer.dest,
            filetime::FileTime::from_system_time(mtime),
        );
    }

    Ok(())
}

/// Copy file with buffered I/O
fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    let src_file = File::open(source)?;
    let dest_file = File::create(dest)?;

    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, dest_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()?;
    Ok(())
}

/// Delete everything directly under a directory. The caller has already
/// collected the double confirmation.
pub fn clear_directory(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Remove destination directories whose subtrees hold no media at all,
/// deepest first. Returns how many were removed.
pub fn prune_media_free_dirs(root: &Path, config: &Config) -> Result<usize> {
    let dirs: Vec<PathBuf> = WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir() && e.path() != root)
        .map(|e| e.path().to_path_buf())
        .collect();

    let mut removed = 0;
    for dir in dirs {
        if !dir.exists() {
            continue;
        }
        if !subtree_has_media(&dir, config) {
            match fs::remove_dir_all(&dir) {
                Ok(()) => {
                    info!(dir = %dir.display(), "Pruned media-free directory");
                    removed += 1;
                }
                Err(e) => warn!(dir = %dir.display(), error = %e, "Failed to prune directory"),
            }
        }
    }

    Ok(removed)
}

fn subtree_has_media(dir: &Path, config: &Config) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| {
            e.path().is_file()
                && e.path()
                    .extension()
                    .and_then(|x| x.to_str())
                    .map(|x| config.kind_of(x).is_some())
                    .unwrap_or(false)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ParsedEntry;
    use chrono::NaiveDate;
    use std::fs::File;
    use tempfile::tempdir;

    fn entry(dir: &Path, name: &str, date: (i32, u32, u32), label: Option<&str>) -> ParsedEntry {
        ParsedEntry {
            path: dir.join(name),
            file_name: name.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            label: label.map(|s| s.to_string()),
        }
    }

    fn single_partition(group: &SuffixGroup) -> Vec<EventPartition> {
        crate::classify::partition(group, &[])
    }

    #[test]
    fn test_plan_below_threshold_goes_to_month_folder() {
        let src = PathBuf::from("/lib");
        let entries: Vec<ParsedEntry> = (15..=20)
            .map(|day| {
                entry(
                    &src,
                    &format!("202301{}_100000_italy.jpg", day),
                    (2023, 1, day as u32),
                    Some("Italy"),
                )
            })
            .collect();
        let group = SuffixGroup {
            label: Some("Italy".to_string()),
            entries,
        };
        let partitions = single_partition(&group);

        let plan = build_plan(
            &[(group, partitions)],
            Path::new("/out"),
            TransferMode::Copy,
            10,
        );

        assert_eq!(plan.transfers.len(), 6);
        for t in &plan.transfers {
            assert!(
                t.dest.starts_with("/out/2020s/2023/1. January"),
                "unexpected dest {:?}",
                t.dest
            );
        }
    }

    #[test]
    fn test_plan_at_threshold_goes_to_event_folder() {
        let src = PathBuf::from("/lib");
        let entries: Vec<ParsedEntry> = (1..=10)
            .map(|i| {
                entry(
                    &src,
                    &format!("20230115_1000{:02}_italy.jpg", i),
                    (2023, 1, 15),
                    Some("Italy"),
                )
            })
            .collect();
        let group = SuffixGroup {
            label: Some("Italy".to_string()),
            entries,
        };
        let partitions = single_partition(&group);

        let plan = build_plan(
            &[(group, partitions)],
            Path::new("/out"),
            TransferMode::Copy,
            10,
        );

        for t in &plan.transfers {
            assert!(t.dest.starts_with("/out/2020s/2023/Italy"));
        }
    }

    #[test]
    fn test_plan_deduplicates_destinations() {
        let group_a = SuffixGroup {
            label: None,
            entries: vec![entry(
                Path::new("/lib/a"),
                "20230101_120000.jpg",
                (2023, 1, 1),
                None,
            )],
        };
        let group_b = SuffixGroup {
            label: None,
            entries: vec![entry(
                Path::new("/lib/b"),
                "20230101_120000.jpg",
                (2023, 1, 1),
                None,
            )],
        };
        let parts_a = single_partition(&group_a);
        let parts_b = single_partition(&group_b);

        let plan = build_plan(
            &[(group_a, parts_a), (group_b, parts_b)],
            Path::new("/out"),
            TransferMode::Copy,
            10,
        );

        // Same file name, same month: only the first write is planned
        assert_eq!(plan.transfers.len(), 1);
        let dests: HashSet<_> = plan.transfers.iter().map(|t| t.dest.clone()).collect();
        assert_eq!(dests.len(), plan.transfers.len());
    }

    #[test]
    fn test_execute_copy_and_move() {
        let tmp = tempdir().unwrap();
        let src_dir = tmp.path().join("src");
        let out_dir = tmp.path().join("out");
        fs::create_dir_all(&src_dir).unwrap();
        File::create(src_dir.join("20230101_120000.jpg")).unwrap();

        let copy_plan = TransferPlan {
            mode: TransferMode::Copy,
            dest_root: out_dir.clone(),
            transfers: vec![Transfer {
                source: src_dir.join("20230101_120000.jpg"),
                dest: out_dir.join("2020s/2023/1. January/20230101_120000.jpg"),
            }],
        };
        let report = execute(&copy_plan, 1);
        assert_eq!(report.transferred, 1);
        assert!(report.failed.is_empty());
        assert!(src_dir.join("20230101_120000.jpg").exists());
        assert!(out_dir.join("2020s/2023/1. January/20230101_120000.jpg").exists());

        let move_plan = TransferPlan {
            mode: TransferMode::Move,
            dest_root: src_dir.clone(),
            transfers: vec![Transfer {
                source: src_dir.join("20230101_120000.jpg"),
                dest: src_dir.join("2020s/2023/1. January/20230101_120000.jpg"),
            }],
        };
        let report = execute(&move_plan, 1);
        assert_eq!(report.transferred, 1);
        assert!(!src_dir.join("20230101_120000.jpg").exists());
        assert!(src_dir.join("2020s/2023/1. January/20230101_120000.jpg").exists());
    }

    #[test]
    fn test_execute_reports_failures_without_aborting() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("out");
        File::create(tmp.path().join("real.jpg")).unwrap();

        let plan = TransferPlan {
            mode: TransferMode::Copy,
            dest_root: out.clone(),
            transfers: vec![
                Transfer {
                    source: tmp.path().join("ghost.jpg"),
                    dest: out.join("a/ghost.jpg"),
                },
                Transfer {
                    source: tmp.path().join("real.jpg"),
                    dest: out.join("a/real.jpg"),
                },
            ],
        };

        let report = execute(&plan, 1);
        assert_eq!(report.transferred, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(out.join("a/real.jpg").exists());
    }

    #[test]
    fn test_clear_directory() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("dest");
        fs::create_dir_all(dir.join("nested")).unwrap();
        File::create(dir.join("file.txt")).unwrap();
        File::create(dir.join("nested/photo.jpg")).unwrap();

        clear_directory(&dir).unwrap();
        assert!(dir.exists());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_prune_media_free_dirs() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("2020s/2023/1. January")).unwrap();
        fs::create_dir_all(root.join("2020s/2024/empty")).unwrap();
        fs::create_dir_all(root.join("notes")).unwrap();
        File::create(root.join("2020s/2023/1. January/20230101_120000.jpg")).unwrap();
        File::create(root.join("notes/readme.txt")).unwrap();

        let config = Config::default();
        let removed = prune_media_free_dirs(root, &config).unwrap();

        assert!(root.join("2020s/2023/1. January").exists());
        assert!(!root.join("2020s/2024").exists());
        assert!(!root.join("notes").exists());
        assert!(removed >= 2);
    }
}
