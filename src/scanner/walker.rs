//! Recursive directory traversal using jwalk.
//!
//! # Overview
//!
//! [`Walker`] visits every entry below a root directory and turns each
//! non-directory entry into a [`FileRecord`]. Children are visited in name
//! order so two runs over the same tree index files identically.
//!
//! - Directory symlinks are not descended into
//! - File entries are stat'ed following symlinks, so a symlink to a file is
//!   indexed under the link's path and the target's identity
//! - Symlinks to directories are skipped silently
//! - Anything else that is not a regular file is yielded as an error
//!
//! # Example
//!
//! ```no_run
//! use rmdups::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads")).unwrap();
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

use super::{FileRecord, ScanError};

/// Directory walker yielding [`FileRecord`]s.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
}

impl Walker {
    /// Create a walker for `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be stat'ed or is not a directory.
    pub fn new(root: &Path) -> Result<Self, ScanError> {
        let metadata = std::fs::metadata(root).map_err(|e| ScanError::from_io(root, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Walk the directory tree.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let walk_dir = WalkDir::new(&self.root)
            .parallelism(Parallelism::Serial)
            .follow_links(false)
            .skip_hidden(false)
            .sort(true);

        walk_dir.into_iter().filter_map(move |entry_result| match entry_result {
            Ok(entry) => {
                if entry.depth == 0 || entry.file_type().is_dir() {
                    return None;
                }
                self.process_entry(entry.path())
            }
            Err(e) => {
                let path = e
                    .path()
                    .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                Some(Err(ScanError::Io {
                    path,
                    source: std::io::Error::other(e.to_string()),
                }))
            }
        })
    }

    /// Stat a non-directory entry and build its record.
    fn process_entry(&self, path: PathBuf) -> Option<Result<FileRecord, ScanError>> {
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => return Some(Err(ScanError::from_io(&path, e))),
        };

        if metadata.is_dir() {
            log::trace!("Not descending into directory symlink: {}", path.display());
            return None;
        }

        Some(FileRecord::from_metadata(path, &metadata))
    }
}
