//! EXIF tag reading for still images

use crate::error::{Error, Result};
use exif::{In, Reader};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Read all primary-IFD EXIF tags into a name -> display-value map.
pub fn read_tags(path: &Path) -> Result<BTreeMap<String, String>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| Error::ExifRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut tags = BTreeMap::new();
    for field in exif.fields() {
        if field.ifd_num != In::PRIMARY {
            continue;
        }
        let name = field.tag.to_string();
        // Unknown tags stringify as "Tag(..)"; skip them
        if name.starts_with("Tag(") {
            continue;
        }
        tags.entry(name)
            .or_insert_with(|| field.display_value().to_string());
    }

    trace!(path = %path.display(), count = tags.len(), "Read EXIF tags");
    Ok(tags)
}
