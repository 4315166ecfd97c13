//! Configuration types for the archivist

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default minimum number of files a suffix needs before it earns its own
/// event folder during restructuring.
pub const DEFAULT_EVENT_THRESHOLD: usize = 10;

/// Media kind, determined by extension set membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Regular image files (jpg, png, etc.)
    Image,
    /// Camera RAW files (arw, cr2, etc.)
    RawImage,
    /// Video files (mp4, mov, etc.)
    Video,
}

/// Which extension categories an operation should pick up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryFilter {
    pub images: bool,
    pub raw: bool,
    pub video: bool,
}

impl CategoryFilter {
    /// Images only
    pub fn images() -> Self {
        Self { images: true, raw: false, video: false }
    }

    /// Everything the configuration knows about
    pub fn all() -> Self {
        Self { images: true, raw: true, video: true }
    }

    /// Videos only
    pub fn videos() -> Self {
        Self { images: false, raw: false, video: true }
    }

    pub fn accepts(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Image => self.images,
            MediaKind::RawImage => self.raw,
            MediaKind::Video => self.video,
        }
    }
}

/// Configuration for the archivist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Minimum file count for a suffix to get an event-named folder
    /// instead of falling back to month grouping
    #[serde(default = "default_event_threshold")]
    pub event_threshold: usize,

    /// Number of threads for parallel file transfers (0 = auto)
    #[serde(default)]
    pub threads: usize,

    /// Candidate font files for the image caption overlay, tried in order
    #[serde(default = "default_font_paths")]
    pub font_paths: Vec<PathBuf>,

    /// Supported image extensions
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// Supported video extensions
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,

    /// Supported RAW extensions
    #[serde(default = "default_raw_extensions")]
    pub raw_extensions: Vec<String>,
}

fn default_event_threshold() -> usize {
    DEFAULT_EVENT_THRESHOLD
}

fn default_font_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
        PathBuf::from("/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf"),
        PathBuf::from("C:\\Windows\\Fonts\\arialbd.ttf"),
        PathBuf::from("/System/Library/Fonts/Supplemental/Arial Bold.ttf"),
    ]
}

fn default_image_extensions() -> Vec<String> {
    [
        "jpg", "jpeg", "jpe", "jfif", "png", "gif", "bmp", "webp", "heic",
        "heif", "avif", "tiff", "tif",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_video_extensions() -> Vec<String> {
    [
        "mp4", "mov", "avi", "mkv", "wmv", "mts", "m2ts", "flv", "m4v",
        "3gp", "mpg", "mpeg", "webm", "ts",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_raw_extensions() -> Vec<String> {
    [
        "raw", "arw", "srf", "sr2", "cr2", "cr3", "nef", "nrw", "orf",
        "rw2", "dng", "raf", "srw", "pef", "erf", "mrw", "x3f", "3fr",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_threshold: default_event_threshold(),
            threads: 0, // Auto-detect
            font_paths: default_font_paths(),
            image_extensions: default_image_extensions(),
            video_extensions: default_video_extensions(),
            raw_extensions: default_raw_extensions(),
        }
    }
}

impl Config {
    /// Check if a file extension is a supported regular image format
    pub fn is_image(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.image_extensions.iter().any(|e| e == &ext_lower)
    }

    /// Check if a file extension is a supported video format
    pub fn is_video(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.video_extensions.iter().any(|e| e == &ext_lower)
    }

    /// Check if a file extension is a supported RAW format
    pub fn is_raw(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.raw_extensions.iter().any(|e| e == &ext_lower)
    }

    /// Get the media kind for a given extension, if supported at all.
    /// RAW wins over image for extensions present in both sets.
    pub fn kind_of(&self, ext: &str) -> Option<MediaKind> {
        if self.is_raw(ext) {
            Some(MediaKind::RawImage)
        } else if self.is_video(ext) {
            Some(MediaKind::Video)
        } else if self.is_image(ext) {
            Some(MediaKind::Image)
        } else {
            None
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError { source: e })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Archivist Configuration File
# This file uses TOML format (https://toml.io)

# Minimum number of files sharing a suffix before restructuring gives the
# suffix its own event folder (e.g. "2020s/2023/Italy") instead of falling
# back to month folders (e.g. "2020s/2023/1. January")
event_threshold = 10

# Number of threads for parallel file transfers (0 = auto-detect)
threads = 0

# Candidate font files for the image caption overlay, tried in order
font_paths = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
]

# Supported file extensions (customize as needed)
image_extensions = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "heif", "avif", "tiff", "tif"]
video_extensions = ["mp4", "mov", "avi", "mkv", "wmv", "mts", "m2ts", "flv", "m4v", "3gp"]
raw_extensions = ["raw", "arw", "cr2", "cr3", "nef", "orf", "rw2", "dng", "raf", "srw", "pef"]
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError { source: toml::ser::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}
