//! File input service
//!
//! Turns paths on disk into [`DroppedFile`]s, the same shape a drop zone or
//! file picker hands to intake.

use crate::{
    error::{ClearCutError, Result},
    types::DroppedFile,
};
use std::path::Path;

/// Service for reading dropped files from the filesystem
pub struct FileIntakeService;

impl FileIntakeService {
    /// Read a file as if it had been dropped
    ///
    /// The MIME type is left undeclared so intake classifies it from the
    /// extension and contents.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use clearcut::services::FileIntakeService;
    ///
    /// let dropped = FileIntakeService::load("photo.jpg")?;
    /// assert_eq!(dropped.name, "photo.jpg");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DroppedFile> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(ClearCutError::file_io_error(
                "read dropped file",
                path,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "not a regular file"),
            ));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| ClearCutError::file_io_error("read dropped file", path, &e))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(DroppedFile::new(name, bytes))
    }

    /// Read every path of a drop, failing on the first unreadable one
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<DroppedFile>> {
        paths.iter().map(Self::load).collect()
    }
}
