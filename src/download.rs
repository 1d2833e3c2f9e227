//! Result download
//!
//! Saving is a local operation: the processed blob is written under a name
//! derived from the original upload, `<base>_clearcut.png`.

use crate::error::{ClearCutError, Result};
use crate::types::Blob;
use std::path::{Path, PathBuf};
use tracing::info;

/// Suffix appended to the original base name
pub const RESULT_SUFFIX: &str = "_clearcut";

/// Extension of every download
pub const RESULT_EXTENSION: &str = "png";

const FALLBACK_BASE_NAME: &str = "image";

/// File name offered when downloading the result of `original_name`
///
/// Only the last extension is stripped, and any directory part is ignored.
#[must_use]
pub fn download_file_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_BASE_NAME);
    format!("{}{}.{}", base, RESULT_SUFFIX, RESULT_EXTENSION)
}

/// Destination of a download
pub trait SaveTarget {
    /// Save `blob` under `file_name` and return where it ended up
    fn save(&self, file_name: &str, blob: &Blob) -> Result<PathBuf>;
}

/// Saves into a directory, picking `name (n).png` when the name is taken
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectoryTarget {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            overwrite: false,
        }
    }

    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn destination(&self, file_name: &str) -> PathBuf {
        let candidate = self.dir.join(file_name);
        if self.overwrite || !candidate.exists() {
            return candidate;
        }

        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(FALLBACK_BASE_NAME);
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(RESULT_EXTENSION);

        (1..)
            .map(|n| self.dir.join(format!("{} ({}).{}", stem, n, extension)))
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }
}

impl SaveTarget for DirectoryTarget {
    fn save(&self, file_name: &str, blob: &Blob) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ClearCutError::file_io_error("create download directory", &self.dir, &e))?;

        let path = self.destination(file_name);
        std::fs::write(&path, blob.bytes())
            .map_err(|e| ClearCutError::file_io_error("write download", &path, &e))?;

        info!(path = %path.display(), bytes = blob.len(), "Saved result");
        Ok(path)
    }
}
