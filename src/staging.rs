//! Per-request on-disk staging of uploads.
//!
//! Staged files are `tempfile` temp files inside the staging directory, so two
//! requests uploading the same filename never share a path. A [`StagedFile`]
//! removes its file when released, and the underlying `NamedTempFile` removes
//! it on drop if the request future is cancelled or panics before release.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::upload::{sanitize_filename, UploadedImage};

const STAGED_PREFIX: &str = "upload-";

#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the staging directory if it does not exist yet.
    pub async fn ensure_exists(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Write the upload to a unique path inside the staging directory.
    pub fn stage(&self, upload: &UploadedImage) -> std::io::Result<StagedFile> {
        let suffix = format!("-{}", sanitize_filename(&upload.filename));
        let mut file = tempfile::Builder::new()
            .prefix(STAGED_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;

        // On failure `file` drops here and removes whatever was written.
        file.write_all(&upload.bytes)?;
        file.flush()?;
        debug!(path = %file.path().display(), size = upload.bytes.len(), "Staged upload");

        Ok(StagedFile { file })
    }
}

/// A staged upload owned by exactly one request.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.file.path()).await
    }

    /// Delete the staged file. Failures are logged, not returned.
    pub fn release(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!(path = %path.display(), "Removed staged upload"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove staged upload"
            ),
        }
    }
}
