//! Core data types shared by intake, removal and presentation

use std::fmt;
use std::sync::Arc;

/// MIME type of every processed result
pub const RESULT_MIME_TYPE: &str = "image/png";

/// Immutable in-memory binary resource with its MIME type
///
/// Cloning is cheap; the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl Blob {
    /// Wrap raw bytes with a MIME type
    pub fn new<B: Into<Arc<[u8]>>, S: Into<String>>(bytes: B, mime_type: S) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A file offered to intake by a drop or a file picker, not yet validated
#[derive(Debug, Clone)]
pub struct DroppedFile {
    /// File name as reported by the source, including extension
    pub name: String,
    /// MIME type declared by the source, if any
    pub declared_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    pub fn new<S: Into<String>>(name: S, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            bytes,
        }
    }

    #[must_use]
    pub fn with_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.declared_type = Some(mime_type.into());
        self
    }
}

/// An image file that passed intake
///
/// Only [`crate::intake::accept`] constructs these, so holding one proves the
/// content was classified as `image/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    blob: Blob,
}

impl ImageFile {
    pub(crate) fn new(name: String, blob: Blob) -> Self {
        Self { name, blob }
    }

    /// Original file name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        self.blob.mime_type()
    }
}

/// Output produced by a background remover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    blob: Blob,
}

impl ProcessedImage {
    /// Wrap PNG bytes produced by a remover
    pub fn png<B: Into<Arc<[u8]>>>(bytes: B) -> Self {
        Self {
            blob: Blob::new(bytes, RESULT_MIME_TYPE),
        }
    }

    #[must_use]
    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    #[must_use]
    pub fn into_blob(self) -> Blob {
        self.blob
    }
}
