//! Best-effort metadata writing via an exiftool subprocess
//!
//! Tags are applied one at a time through a fixed name -> exiftool-key
//! table. Unknown tags are skipped and reported; a failed tag never
//! aborts the rest of the file.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Exported tag names we know how to hand to exiftool, paired with the
/// key exiftool expects.
const TAG_TABLE: &[(&str, &str)] = &[
    ("Make", "Make"),
    ("Model", "Model"),
    ("Software", "Software"),
    ("Orientation", "Orientation"),
    ("DateTime", "ModifyDate"),
    ("DateTimeOriginal", "DateTimeOriginal"),
    ("DateTimeDigitized", "CreateDate"),
    ("SubsecTimeOriginal", "SubSecTimeOriginal"),
    ("SubsecTimeDigitized", "SubSecTimeDigitized"),
    ("OffsetTime", "OffsetTime"),
    ("OffsetTimeOriginal", "OffsetTimeOriginal"),
    ("ExposureTime", "ExposureTime"),
    ("FNumber", "FNumber"),
    ("ISOSpeedRatings", "ISO"),
    ("ShutterSpeedValue", "ShutterSpeedValue"),
    ("ApertureValue", "ApertureValue"),
    ("BrightnessValue", "BrightnessValue"),
    ("ExposureBiasValue", "ExposureCompensation"),
    ("MaxApertureValue", "MaxApertureValue"),
    ("SubjectDistance", "SubjectDistance"),
    ("MeteringMode", "MeteringMode"),
    ("Flash", "Flash"),
    ("FocalLength", "FocalLength"),
    ("FocalLengthIn35mmFilm", "FocalLengthIn35mmFormat"),
    ("ColorSpace", "ColorSpace"),
    ("WhiteBalance", "WhiteBalance"),
    ("ExposureMode", "ExposureMode"),
    ("ExposureProgram", "ExposureProgram"),
    ("SceneCaptureType", "SceneCaptureType"),
    ("DigitalZoomRatio", "DigitalZoomRatio"),
    ("Contrast", "Contrast"),
    ("Saturation", "Saturation"),
    ("Sharpness", "Sharpness"),
    ("LensMake", "LensMake"),
    ("LensModel", "LensModel"),
    ("UserComment", "UserComment"),
    ("GPSLatitude", "GPSLatitude"),
    ("GPSLatitudeRef", "GPSLatitudeRef"),
    ("GPSLongitude", "GPSLongitude"),
    ("GPSLongitudeRef", "GPSLongitudeRef"),
    ("GPSAltitude", "GPSAltitude"),
    ("GPSAltitudeRef", "GPSAltitudeRef"),
    ("GPSDateStamp", "GPSDateStamp"),
    ("GPSTimeStamp", "GPSTimeStamp"),
];

/// Cached exiftool availability check
static EXIFTOOL_AVAILABLE: OnceLock<bool> = OnceLock::new();

pub fn is_available() -> bool {
    *EXIFTOOL_AVAILABLE.get_or_init(|| {
        Command::new("exiftool")
            .arg("-ver")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    })
}

fn exiftool_key(tag: &str) -> Option<&'static str> {
    TAG_TABLE
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, key)| *key)
}

/// Outcome of writing one file's tags
#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: usize,
    pub skipped_unknown: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Apply a tag map to a file, one tag at a time.
pub fn write_tags(path: &Path, tags: &BTreeMap<String, String>) -> Result<WriteReport> {
    if !is_available() {
        return Err(Error::ExiftoolNotFound);
    }

    let mut report = WriteReport::default();

    for (tag, value) in tags {
        let Some(key) = exiftool_key(tag) else {
            debug!(tag, "Skipping unknown tag");
            report.skipped_unknown.push(tag.clone());
            continue;
        };

        let output = Command::new("exiftool")
            .arg("-overwrite_original")
            .arg(format!("-{}={}", key, value))
            .arg(path)
            .output();

        match output {
            Ok(out) if out.status.success() => report.written += 1,
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
                warn!(tag, error = %stderr, "Failed to write tag");
                report.failed.push((tag.clone(), stderr));
            }
            Err(e) => {
                warn!(tag, error = %e, "Failed to invoke exiftool");
                report.failed.push((tag.clone(), e.to_string()));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_table_lookup() {
        assert_eq!(exiftool_key("DateTimeOriginal"), Some("DateTimeOriginal"));
        assert_eq!(exiftool_key("ISOSpeedRatings"), Some("ISO"));
        assert_eq!(exiftool_key("DateTimeDigitized"), Some("CreateDate"));
        assert_eq!(exiftool_key("MakerNoteUnheardOf"), None);
    }
}
