//! Video container tag reading via an ffprobe subprocess

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;
use tracing::trace;

/// Cached ffprobe availability check
static FFPROBE_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Check if ffprobe is available (cached)
pub fn is_available() -> bool {
    *FFPROBE_AVAILABLE.get_or_init(|| {
        Command::new("ffprobe")
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    })
}

/// Read container and stream tags into a name -> value map. Format-level
/// tags win over stream-level ones when both carry the same key.
pub fn read_tags(path: &Path) -> Result<BTreeMap<String, String>> {
    if !is_available() {
        return Err(Error::FfprobeNotFound);
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| Error::VideoMetadata {
            path: path.to_path_buf(),
            message: format!("Failed to execute ffprobe: {}", e),
        })?;

    if !output.status.success() {
        return Err(Error::VideoMetadata {
            path: path.to_path_buf(),
            message: format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ),
        });
    }

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(|e| {
        Error::VideoMetadata {
            path: path.to_path_buf(),
            message: format!("Failed to parse ffprobe JSON: {}", e),
        }
    })?;

    let mut tags = BTreeMap::new();

    if let Some(streams) = json.get("streams").and_then(|s| s.as_array()) {
        for stream in streams {
            collect_tags(stream.get("tags"), &mut tags);
        }
    }
    // Inserted last so format-level values overwrite stream-level ones
    if let Some(format) = json.get("format") {
        collect_tags(format.get("tags"), &mut tags);
    }

    trace!(path = %path.display(), count = tags.len(), "Read video tags");
    Ok(tags)
}

fn collect_tags(tags: Option<&serde_json::Value>, into: &mut BTreeMap<String, String>) {
    if let Some(map) = tags.and_then(|t| t.as_object()) {
        for (key, value) in map {
            if let Some(s) = value.as_str() {
                into.insert(key.clone(), s.to_string());
            }
        }
    }
}
