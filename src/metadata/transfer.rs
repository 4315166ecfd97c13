//! Metadata export to CSV/JSON and import back onto files
//!
//! Both formats use the literal `File Name` column as the join key back
//! to on-disk files during import.

use crate::config::{CategoryFilter, Config};
use crate::error::{Error, Result};
use crate::media::{self, MediaFile};
use crate::metadata::{writer, MetadataProvider};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::SystemTime;
use tracing::{info, warn};

/// One exported file's metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(rename = "File Name")]
    pub file_name: String,
    #[serde(rename = "File Size")]
    pub file_size: u64,
    #[serde(rename = "Date Created")]
    pub date_created: String,
    #[serde(rename = "Date Modified")]
    pub date_modified: String,
    #[serde(rename = "EXIF Data", default)]
    pub exif: BTreeMap<String, String>,
}

const CSV_HEADERS: [&str; 5] = [
    "File Name",
    "File Size",
    "Date Created",
    "Date Modified",
    "EXIF Data",
];

fn format_system_time(st: Option<SystemTime>) -> String {
    st.map(|t| {
        let dt: DateTime<Local> = t.into();
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    })
    .unwrap_or_default()
}

/// Collect metadata records for every image in a folder. Unreadable
/// files contribute a record with an empty tag map rather than aborting
/// the export.
pub fn collect_records(
    dir: &Path,
    config: &Config,
    recursive: bool,
    provider: &dyn MetadataProvider,
) -> Result<Vec<MetadataRecord>> {
    let files = media::scan_directory(dir, config, CategoryFilter::images(), recursive)?;

    let mut records = Vec::with_capacity(files.len());
    for file in &files {
        records.push(record_for(file, provider));
    }
    Ok(records)
}

fn record_for(file: &MediaFile, provider: &dyn MetadataProvider) -> MetadataRecord {
    let size = std::fs::metadata(&file.path).map(|m| m.len()).unwrap_or(0);
    MetadataRecord {
        file_name: file.file_name(),
        file_size: size,
        date_created: format_system_time(file.created),
        date_modified: format_system_time(file.modified),
        exif: provider.read(file),
    }
}

/// Write records as human-readable JSON.
pub fn export_json(path: &Path, records: &[MetadataRecord]) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    info!(path = %path.display(), count = records.len(), "Metadata exported (JSON)");
    Ok(())
}

/// Write records as flat CSV; the tag map is stringified into one column.
pub fn export_csv(path: &Path, records: &[MetadataRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADERS)?;
    for record in records {
        writer.write_record([
            record.file_name.clone(),
            record.file_size.to_string(),
            record.date_created.clone(),
            record.date_modified.clone(),
            serde_json::to_string(&record.exif)?,
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), count = records.len(), "Metadata exported (CSV)");
    Ok(())
}

/// Load records from a previously exported CSV or JSON file.
pub fn load_records(path: &Path) -> Result<Vec<MetadataRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => {
            let file = File::open(path)?;
            Ok(serde_json::from_reader(BufReader::new(file))?)
        }
        "csv" => load_csv(path),
        _ => Err(Error::UnsupportedMetadataFile {
            path: path.to_path_buf(),
        }),
    }
}

fn load_csv(path: &Path) -> Result<Vec<MetadataRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let name_col = column("File Name").ok_or_else(|| Error::UnsupportedMetadataFile {
        path: path.to_path_buf(),
    })?;
    let size_col = column("File Size");
    let created_col = column("Date Created");
    let modified_col = column("Date Modified");
    let exif_col = column("EXIF Data");

    let field = |row: &csv::StringRecord, col: Option<usize>| {
        col.and_then(|c| row.get(c)).unwrap_or_default().to_string()
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let exif = field(&row, exif_col);
        records.push(MetadataRecord {
            file_name: field(&row, Some(name_col)),
            file_size: field(&row, size_col).parse().unwrap_or(0),
            date_created: field(&row, created_col),
            date_modified: field(&row, modified_col),
            // Dict-valued columns round-trip as JSON text
            exif: serde_json::from_str(&exif).unwrap_or_default(),
        });
    }
    Ok(records)
}

/// Outcome of an import run
#[derive(Debug, Default)]
pub struct ImportReport {
    pub updated: usize,
    pub missing: Vec<String>,
    pub tag_failures: usize,
    pub failed: Vec<(String, String)>,
}

/// Apply loaded records to the files in a folder, joined by `File Name`.
pub fn apply_records(records: &[MetadataRecord], folder: &Path) -> Result<ImportReport> {
    if !folder.is_dir() {
        return Err(Error::NotADirectory(folder.to_path_buf()));
    }

    let mut report = ImportReport::default();

    for record in records {
        let target = folder.join(&record.file_name);
        if !target.is_file() {
            warn!(file = %record.file_name, "Not found in folder, skipping");
            report.missing.push(record.file_name.clone());
            continue;
        }

        match writer::write_tags(&target, &record.exif) {
            Ok(write) => {
                report.tag_failures += write.failed.len();
                report.updated += 1;
                info!(
                    file = %record.file_name,
                    written = write.written,
                    skipped = write.skipped_unknown.len(),
                    failed = write.failed.len(),
                    "Updated metadata"
                );
            }
            Err(e) => {
                warn!(file = %record.file_name, error = %e, "Failed to update");
                report.failed.push((record.file_name.clone(), e.to_string()));
            }
        }
    }

    Ok(report)
}
