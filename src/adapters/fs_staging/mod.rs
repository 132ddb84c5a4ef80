// Staging filesystem adapter - Request-scoped temporary files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::errors::*;

/// Prefix of every staging file name
const STAGING_PREFIX: &str = "qe-";

/// Scratch directory shared by all requests
///
/// Files handed out by [`StagingArea::acquire`] get a random name from
/// `tempfile`, so concurrent requests never collide and need no locking.
#[derive(Debug, Clone)]
pub struct StagingArea {
    scratch_dir: PathBuf,
}

impl StagingArea {
    /// Create a staging area rooted at `scratch_dir`. The directory is created on first use.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Allocate a uniquely named staging file ending in `suffix`
    pub fn acquire(&self, suffix: &str) -> Result<StagingFile, ConversionError> {
        fs::create_dir_all(&self.scratch_dir).map_err(|e| {
            ConversionError::encode_failed(format!(
                "failed to create scratch directory {}: {}",
                self.scratch_dir.display(),
                e
            ))
        })?;

        let named = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(suffix)
            .tempfile_in(&self.scratch_dir)
            .map_err(|e| {
                ConversionError::encode_failed(format!("failed to create staging file: {}", e))
            })?;

        // Deletion is owned by StagingFile from here on.
        let (_file, path) = named.keep().map_err(|e| {
            ConversionError::encode_failed(format!("failed to keep staging file: {}", e))
        })?;

        debug!("Acquired staging file {}", path.display());
        Ok(StagingFile {
            path,
            released: false,
        })
    }
}

/// Temporary file owned by exactly one in-flight request
///
/// Removed by [`StagingFile::release`] or, failing that, when dropped. Drop
/// also runs when the owning future is cancelled. Removal failures are
/// logged and never returned.
#[derive(Debug)]
pub struct StagingFile {
    path: PathBuf,
    released: bool,
}

impl StagingFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the underlying file now
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Released staging file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                let err = ConversionError::CleanupFailed {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                };
                warn!("{}", err);
            }
        }
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        self.remove();
    }
}
