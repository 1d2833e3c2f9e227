//! File intake
//!
//! Classifies dropped files and admits only single images. Anything else is
//! ignored without an error, matching a drop zone with an `image/*` filter.

use crate::types::{Blob, DroppedFile, ImageFile};
use image::ImageFormat;
use std::path::Path;
use tracing::debug;

/// MIME prefix accepted by the drop zone
pub const IMAGE_MIME_PREFIX: &str = "image/";

/// Determine the MIME type of a dropped file
///
/// The declared type wins, as a browser reports it from the file picker.
/// Without one, the extension is consulted, then the leading bytes.
#[must_use]
pub fn detect_mime_type(file: &DroppedFile) -> Option<String> {
    if let Some(declared) = file.declared_type.as_deref() {
        let declared = declared.trim();
        if !declared.is_empty() {
            return Some(declared.to_ascii_lowercase());
        }
    }

    let from_extension = Path::new(&file.name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension);
    if let Some(format) = from_extension {
        return Some(format.to_mime_type().to_string());
    }

    image::guess_format(&file.bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Whether a MIME type passes the image filter
#[must_use]
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with(IMAGE_MIME_PREFIX) && mime_type.len() > IMAGE_MIME_PREFIX.len()
}

/// Admit a single dropped file if it is a non-empty image
#[must_use]
pub fn accept(file: DroppedFile) -> Option<ImageFile> {
    if file.bytes.is_empty() {
        debug!(file_name = %file.name, "Ignoring empty drop");
        return None;
    }

    let Some(mime_type) = detect_mime_type(&file) else {
        debug!(file_name = %file.name, "Ignoring drop with unknown type");
        return None;
    };

    if !is_image_mime(&mime_type) {
        debug!(file_name = %file.name, mime_type = %mime_type, "Ignoring non-image drop");
        return None;
    }

    let DroppedFile { name, bytes, .. } = file;
    Some(ImageFile::new(name, Blob::new(bytes, mime_type)))
}

/// Admit a drop only when it carries exactly one image file
#[must_use]
pub fn accept_drop(mut files: Vec<DroppedFile>) -> Option<ImageFile> {
    if files.len() != 1 {
        debug!(count = files.len(), "Ignoring drop that is not a single file");
        return None;
    }
    files.pop().and_then(accept)
}
