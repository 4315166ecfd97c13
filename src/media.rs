//! Media file model and directory scanning

use crate::config::{CategoryFilter, Config, MediaKind};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A filesystem entry the archivist knows how to handle.
///
/// An immutable view of disk state at scan time; each operation pass
/// re-scans rather than caching between passes.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Absolute path
    pub path: PathBuf,
    /// Extension, lower-cased
    pub extension: String,
    /// Kind, by extension set membership
    pub kind: MediaKind,
    /// Filesystem modify time, if the platform reports one
    pub modified: Option<SystemTime>,
    /// Filesystem create time; platform-dependent meaning
    pub created: Option<SystemTime>,
}

impl MediaFile {
    /// Build a `MediaFile` from a path, if its extension is supported
    /// and selected by the filter.
    pub fn from_path(path: &Path, config: &Config, filter: CategoryFilter) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
        let kind = config.kind_of(&ext)?;
        if !filter.accepts(kind) {
            return None;
        }

        let meta = fs::metadata(path).ok();
        Some(Self {
            path: path.to_path_buf(),
            extension: ext,
            kind,
            modified: meta.as_ref().and_then(|m| m.modified().ok()),
            created: meta.as_ref().and_then(|m| m.created().ok()),
        })
    }

    /// File name component as UTF-8, lossy
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Scan a directory for media files matching the category filter.
///
/// Results are sorted by path so downstream collision indexing is stable.
pub fn scan_directory(
    dir: &Path,
    config: &Config,
    filter: CategoryFilter,
    recursive: bool,
) -> Result<Vec<MediaFile>> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .max_depth(max_depth)
        .follow_links(true)
        .into_iter()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if path.is_file()
            && let Some(file) = MediaFile::from_path(path, config, filter)
        {
            files.push(file);
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(dir = %dir.display(), count = files.len(), "Scanned media files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_scan_filters_by_category() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "b.arw");
        touch(tmp.path(), "c.mp4");
        touch(tmp.path(), "d.txt");

        let config = Config::default();

        let images = scan_directory(tmp.path(), &config, CategoryFilter::images(), false).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].extension, "jpg");

        let all = scan_directory(tmp.path(), &config, CategoryFilter::all(), false).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_scan_recursion() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "top.jpg");
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        touch(&sub, "nested.jpg");

        let config = Config::default();

        let flat = scan_directory(tmp.path(), &config, CategoryFilter::images(), false).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = scan_directory(tmp.path(), &config, CategoryFilter::images(), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_scan_rejects_non_directory() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "a.jpg");
        let config = Config::default();
        let result = scan_directory(
            &tmp.path().join("a.jpg"),
            &config,
            CategoryFilter::images(),
            false,
        );
        assert!(matches!(result, Err(Error::NotADirectory(_))));
    }

    #[test]
    fn test_uppercase_extension_normalized() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "SHOUTY.JPG");
        let config = Config::default();
        let files = scan_directory(tmp.path(), &config, CategoryFilter::images(), false).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].extension, "jpg");
        assert_eq!(files[0].kind, MediaKind::Image);
    }
}
