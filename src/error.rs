//! Error types for the archivist

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for archivist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the archivist
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Failed to read video metadata from {path}: {message}")]
    VideoMetadata { path: PathBuf, message: String },

    #[error("{count} files do not conform to the canonical naming scheme")]
    NonconformingNames { count: usize },

    #[error("Failed to open image {path}: {message}")]
    ImageOpen { path: PathBuf, message: String },

    #[error("No usable font found; tried {0:?}")]
    FontNotFound(Vec<PathBuf>),

    #[error("ffmpeg not found. Please install FFmpeg and ensure it is in PATH")]
    FfmpegNotFound,

    #[error("ffprobe not found. Please install FFmpeg and ensure ffprobe is in PATH")]
    FfprobeNotFound,

    #[error("exiftool not found. Please install ExifTool and ensure it is in PATH")]
    ExiftoolNotFound,

    #[error("Transcode failed for {path}: {message}")]
    Transcode { path: PathBuf, message: String },

    #[error("Unsupported metadata file {path}: expected .csv or .json")]
    UnsupportedMetadataFile { path: PathBuf },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
