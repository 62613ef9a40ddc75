//! Removing duplicate files.
//!
//! Two primitives: [`unlink`] removes a file, [`wipe_file`] overwrites its
//! contents with zeros before removing it. Both are strict: a file that
//! has already disappeared is an error, never a silent success.
//!
//! # Example
//!
//! ```no_run
//! use rmdups::actions::delete::{unlink, wipe_file};
//! use std::path::Path;
//!
//! wipe_file(Path::new("/data/old/copy.iso"), 700 * 1024 * 1024, 64 * 1024)?;
//! unlink(Path::new("/data/old/copy.txt"))?;
//! # Ok::<(), rmdups::actions::delete::DeleteError>(())
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for removal operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (already removed or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when opening or removing the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Overwriting the file contents failed.
    #[error("wipe failed for {path}: {source}")]
    WipeFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Path the failed operation was acting on.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::WipeFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Remove `path`.
///
/// # Errors
///
/// Returns `NotFound` if the file is already gone, otherwise the mapped
/// I/O error.
pub fn unlink(path: &Path) -> Result<(), DeleteError> {
    fs::remove_file(path).map_err(|e| {
        log::error!("delete failed for {}: {}", path.display(), e);
        DeleteError::from_io(path, e)
    })
}

/// Overwrite the first `size` bytes of `path` with zeros, flush them to
/// disk, then remove the file.
///
/// Writes go out in pieces of at most `chunk_size` bytes. The file is
/// opened without truncation, so its length is not changed before the
/// unlink.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, written, synced or
/// removed. Nothing is removed if the overwrite fails.
pub fn wipe_file(path: &Path, size: u64, chunk_size: usize) -> Result<(), DeleteError> {
    let mut file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| DeleteError::from_io(path, e))?;

    let zeros = vec![0u8; chunk_size.max(1)];
    let mut remaining = size;
    while remaining > 0 {
        let len = usize::try_from(remaining).map_or(zeros.len(), |r| r.min(zeros.len()));
        file.write_all(&zeros[..len])
            .map_err(|source| DeleteError::WipeFailed {
                path: path.to_path_buf(),
                source,
            })?;
        remaining -= len as u64;
    }
    file.sync_all().map_err(|source| DeleteError::WipeFailed {
        path: path.to_path_buf(),
        source,
    })?;
    drop(file);

    log::debug!("wiped {} bytes of {}", size, path.display());
    unlink(path)
}
