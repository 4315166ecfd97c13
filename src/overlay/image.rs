//! Caption compositing for still images

use crate::config::Config;
use crate::error::{Error, Result};
use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgba};
use imageproc::drawing::{draw_text_mut, text_size};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Caption size relative to the image's short edge
const FONT_FRACTION: f32 = 0.045;
/// Margin from the bottom-right corner, same basis
const MARGIN_FRACTION: f32 = 0.01;

fn load_font(config: &Config) -> Result<FontVec> {
    for candidate in &config.font_paths {
        if candidate.is_file()
            && let Ok(bytes) = fs::read(candidate)
            && let Ok(font) = FontVec::try_from_vec(bytes)
        {
            return Ok(font);
        }
    }
    Err(Error::FontNotFound(config.font_paths.clone()))
}

/// Replace characters that make shell quoting miserable in output names
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == ' ' || c == '(' || c == ')' { '_' } else { c })
        .collect()
}

/// Burn a caption into the bottom-right corner of an image.
///
/// The text is drawn with a dark outline ring and a translucent white
/// fill. Returns the path actually written.
pub fn burn_into_image(
    input: &Path,
    output: &Path,
    caption: &str,
    config: &Config,
) -> Result<PathBuf> {
    let font = load_font(config)?;

    let img = image::open(input).map_err(|e| Error::ImageOpen {
        path: input.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut canvas = img.to_rgba8();

    let (width, height) = (canvas.width(), canvas.height());
    let short_edge = width.min(height) as f32;
    let scale = PxScale::from(short_edge * FONT_FRACTION);
    let margin = (short_edge * MARGIN_FRACTION) as i32;

    let (text_w, text_h) = text_size(scale, &font, caption);
    let x = width as i32 - text_w as i32 - margin;
    let y = height as i32 - text_h as i32 - margin;
    let (x, y) = (x.max(0), y.max(0));

    // Outline ring: offsets at Manhattan distance <= 2, like a stroke
    for dx in -1i32..=1 {
        for dy in -1i32..=1 {
            if (dx != 0 || dy != 0) && dx.abs() + dy.abs() <= 2 {
                draw_text_mut(
                    &mut canvas,
                    Rgba([0, 0, 0, 255]),
                    x + dx,
                    y + dy,
                    scale,
                    &font,
                    caption,
                );
            }
        }
    }
    draw_text_mut(
        &mut canvas,
        Rgba([255, 255, 255, 160]),
        x,
        y,
        scale,
        &font,
        caption,
    );

    let out_path = match output.file_name().and_then(|n| n.to_str()) {
        Some(name) => output.with_file_name(sanitize_name(name)),
        None => output.to_path_buf(),
    };
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }

    // JPEG has no alpha channel; flatten before saving
    DynamicImage::ImageRgba8(canvas)
        .to_rgb8()
        .save(&out_path)
        .map_err(|e| Error::ImageOpen {
            path: out_path.clone(),
            message: format!("save failed: {}", e),
        })?;

    info!(input = %input.display(), output = %out_path.display(), "Burned caption into image");
    Ok(out_path)
}
