//! Scanner module: file records and the collaborators that produce them.
//!
//! This module provides:
//! - [`FileRecord`]: a discovered file with its stat metadata and a
//!   write-once content prefix cache
//! - Physical-file identity via (device, inode) pairs ([`identity`])
//! - Recursive directory traversal ([`walker`])
//! - Newline-delimited path lists from files or stdin ([`index_file`])
//!
//! Both collaborators yield `Result<FileRecord, ScanError>`. An `Err` item is
//! an input anomaly: callers log it and move on.
//!
//! # Example
//!
//! ```no_run
//! use rmdups::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/srv/photos")).unwrap();
//! for record in walker.walk() {
//!     match record {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod identity;
pub mod index_file;
pub mod walker;

use std::cell::OnceCell;
use std::ffi::{OsStr, OsString};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub use identity::FileId;
pub use index_file::{IndexFileReader, IndexSource};
pub use walker::Walker;

/// Write-once cache of a file's leading bytes.
///
/// Starts unfilled. The only transition is [`fill`](Self::fill), which
/// succeeds once; the stored bytes can never be replaced afterwards.
#[derive(Debug, Default)]
pub struct PrefixCache {
    bytes: OnceCell<Box<[u8]>>,
}

impl PrefixCache {
    /// Create an unfilled cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached prefix, if it has been filled.
    #[must_use]
    pub fn get(&self) -> Option<&[u8]> {
        self.bytes.get().map(AsRef::as_ref)
    }

    /// Whether the cache holds its final contents.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.bytes.get().is_some()
    }

    /// Store the prefix. Returns `false` (and drops `bytes`) if already filled.
    pub fn fill(&self, bytes: Vec<u8>) -> bool {
        self.bytes.set(bytes.into_boxed_slice()).is_ok()
    }
}

/// A discovered file.
///
/// Everything except the prefix cache is fixed at construction.
#[derive(Debug)]
pub struct FileRecord {
    /// Path as supplied by the source (relative or absolute)
    pub path: PathBuf,
    /// Final path component, never empty
    pub name: OsString,
    /// File size in bytes at stat time
    pub size: u64,
    /// Physical-file identity, `None` where the platform has no inode concept
    pub id: Option<FileId>,
    /// Last modification time
    pub modified: SystemTime,
    prefix: PrefixCache,
}

impl FileRecord {
    /// Create a record from already-known attributes.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `id` - Device/inode identity, if known
    /// * `modified` - Last modification time
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::EmptyName`] if `path` has no final component.
    pub fn new(
        path: PathBuf,
        size: u64,
        id: Option<FileId>,
        modified: SystemTime,
    ) -> Result<Self, ScanError> {
        let name = match path.file_name() {
            Some(name) if !name.is_empty() => name.to_os_string(),
            _ => return Err(ScanError::EmptyName(path)),
        };
        Ok(Self {
            path,
            name,
            size,
            id,
            modified,
            prefix: PrefixCache::new(),
        })
    }

    /// Create a record from stat metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NotAFile`] for anything but a regular file and
    /// [`ScanError::EmptyName`] if `path` has no final component.
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Result<Self, ScanError> {
        if !metadata.is_file() {
            return Err(ScanError::NotAFile(path));
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let id = FileId::for_file(&path, metadata);
        Self::new(path, metadata.len(), id, modified)
    }

    /// Stat `path` (following symlinks) and build a record from it.
    ///
    /// # Errors
    ///
    /// Any stat failure or a non-file target is reported as a [`ScanError`].
    pub fn stat(path: PathBuf) -> Result<Self, ScanError> {
        match std::fs::metadata(&path) {
            Ok(metadata) => Self::from_metadata(path, &metadata),
            Err(e) => Err(ScanError::from_io(&path, e)),
        }
    }

    /// Base name of the file.
    #[must_use]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The content prefix cache owned by this record.
    #[must_use]
    pub fn prefix(&self) -> &PrefixCache {
        &self.prefix
    }

    /// Whether `other` is the same physical file (equal device and inode).
    #[must_use]
    pub fn is_same_file(&self, other: &FileRecord) -> bool {
        identity::is_same_file(self.id, other.id)
    }
}

/// Input anomalies raised while turning paths into [`FileRecord`]s.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The path exists but is not a regular file.
    #[error("ignore not-a-file: {0}")]
    NotAFile(PathBuf),

    /// The path has no final component to use as a name.
    #[error("empty file name for path, skipping: {0}")]
    EmptyName(PathBuf),

    /// Permission was denied when accessing the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path was not found.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// A traversal root is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Any other I/O error.
    #[error("error getting file info for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// The path the anomaly refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotAFile(p)
            | Self::EmptyName(p)
            | Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::Io { path: p, .. } => p,
        }
    }
}
