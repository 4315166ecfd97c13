//! Caption compositing for videos via an ffmpeg subprocess
//!
//! Each file is one blocking ffmpeg invocation with a drawtext filter.
//! Hardware H.264 encoders are preferred when the local build offers
//! one; the software encoder is the fallback.

use crate::config::Config;
use crate::error::{Error, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Hardware encoders worth probing for, in preference order
const GPU_ENCODERS: &[&str] = &["h264_nvenc", "h264_qsv", "h264_amf"];

static FFMPEG_AVAILABLE: OnceLock<bool> = OnceLock::new();
static SELECTED_ENCODER: OnceLock<Option<&'static str>> = OnceLock::new();

fn is_ffmpeg_available() -> bool {
    *FFMPEG_AVAILABLE.get_or_init(|| {
        Command::new("ffmpeg")
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    })
}

/// Probe the local ffmpeg build for a hardware H.264 encoder (cached).
pub fn detect_gpu_encoder() -> Option<&'static str> {
    *SELECTED_ENCODER.get_or_init(|| {
        let output = Command::new("ffmpeg")
            .args(["-hide_banner", "-encoders"])
            .output()
            .ok()?;
        let listing = String::from_utf8_lossy(&output.stdout).into_owned();
        GPU_ENCODERS
            .iter()
            .copied()
            .find(|encoder| listing.contains(encoder))
    })
}

/// Escape caption text for a drawtext filter argument
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(':', "\\:")
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == ' ' || c == '(' || c == ')' { '_' } else { c })
        .collect()
}

fn drawtext_filter(caption: &str, config: &Config) -> String {
    let mut filter = String::from("drawtext=");
    if let Some(font) = config.font_paths.iter().find(|p| p.is_file()) {
        filter.push_str(&format!("fontfile='{}':", font.display()));
    }
    filter.push_str(&format!(
        "text=\"{}\":fontcolor=white:fontsize=24:borderw=2:bordercolor=black@0.7:\
         box=1:boxcolor=black@0.4:boxborderw=5:x=w-tw-20:y=h-th-20",
        escape_drawtext(caption)
    ));
    filter
}

/// Burn a caption into a video, transcoding to H.264 with the audio
/// stream copied. Overwriting the input goes through a temp file that
/// replaces the original only on success. Returns the path written.
pub fn burn_into_video(
    input: &Path,
    output: &Path,
    caption: &str,
    config: &Config,
) -> Result<PathBuf> {
    if !is_ffmpeg_available() {
        return Err(Error::FfmpegNotFound);
    }

    let overwrite_in_place = input == output;
    let out_file = if overwrite_in_place {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = input
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        input.with_file_name(format!("{}_tmp_{}{}", stem, stamp, ext))
    } else {
        match output.file_name().and_then(|n| n.to_str()) {
            Some(name) => output.with_file_name(sanitize_name(name)),
            None => output.to_path_buf(),
        }
    };

    if let Some(parent) = out_file.parent() {
        fs::create_dir_all(parent)?;
    }

    let codec = match detect_gpu_encoder() {
        Some(encoder) => {
            debug!(encoder, "Using hardware encoder");
            encoder
        }
        None => "libx264",
    };

    let status = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(input)
        .arg("-vf")
        .arg(drawtext_filter(caption, config))
        .args(["-c:v", codec, "-codec:a", "copy"])
        .arg(&out_file)
        .output()
        .map_err(|e| Error::Transcode {
            path: input.to_path_buf(),
            message: format!("failed to run ffmpeg: {}", e),
        })?;

    if !status.status.success() {
        // Leave no half-written temp behind
        if overwrite_in_place && out_file.exists() {
            let _ = fs::remove_file(&out_file);
        }
        return Err(Error::Transcode {
            path: input.to_path_buf(),
            message: String::from_utf8_lossy(&status.stderr)
                .lines()
                .last()
                .unwrap_or("ffmpeg failed")
                .to_string(),
        });
    }

    if overwrite_in_place {
        fs::remove_file(input)?;
        fs::rename(&out_file, input)?;
        info!(path = %input.display(), "Burned caption into video (overwritten)");
        Ok(input.to_path_buf())
    } else {
        info!(input = %input.display(), output = %out_file.display(), "Burned caption into video");
        Ok(out_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_drawtext() {
        assert_eq!(escape_drawtext("3rd June 2024"), "3rd June 2024");
        assert_eq!(escape_drawtext("12:30"), "12\\:30");
        assert_eq!(escape_drawtext("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_drawtext("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_drawtext_filter_shape() {
        let config = Config {
            font_paths: vec![],
            ..Config::default()
        };
        let filter = drawtext_filter("3rd June 2024", &config);
        assert!(filter.starts_with("drawtext=text=\"3rd June 2024\""));
        assert!(filter.contains("x=w-tw-20:y=h-th-20"));
    }
}
