//! Metadata collaborators
//!
//! The core only ever sees a tag-name -> value mapping per file and a
//! best-effort way to write one back. Reading goes through kamadak-exif
//! for still images and an ffprobe subprocess for videos; writing goes
//! through an exiftool subprocess.

pub mod exif;
pub mod ffprobe;
pub mod transfer;
pub mod writer;

use crate::config::MediaKind;
use crate::media::MediaFile;
use std::collections::BTreeMap;
use tracing::debug;

/// Anything that can produce a tag map for a media file. Failure is an
/// empty map; the caller falls back to weaker date signals.
pub trait MetadataProvider {
    fn read(&self, file: &MediaFile) -> BTreeMap<String, String>;
}

/// The default provider: EXIF for images and RAW files, container tags
/// via ffprobe for videos.
#[derive(Debug, Default)]
pub struct MediaMetadataReader;

impl MetadataProvider for MediaMetadataReader {
    fn read(&self, file: &MediaFile) -> BTreeMap<String, String> {
        let result = match file.kind {
            MediaKind::Image | MediaKind::RawImage => exif::read_tags(&file.path),
            MediaKind::Video => ffprobe::read_tags(&file.path),
        };
        match result {
            Ok(map) => map,
            Err(e) => {
                debug!(path = %file.path.display(), error = %e, "No metadata available");
                BTreeMap::new()
            }
        }
    }
}
