//! Physical-file identity.
//!
//! # Overview
//!
//! Hardlinks are multiple directory entries pointing to the same inode on disk.
//! Two paths with equal (device, inode) pairs are the same file, so "deleting the
//! duplicate" would delete the kept copy too. The resolver uses [`FileId`] to
//! refuse such candidates before any content is compared.
//!
//! # Platform Support
//!
//! - **Unix**: Uses (device_id, inode) pairs from file metadata
//! - **Windows**: Uses the volume serial number and the 64-bit file index
//!   reported by `GetFileInformationByHandle`
//! - **Other**: No identity is available; records never compare as the same file

use std::fs::Metadata;
use std::path::Path;

/// Device and inode pair identifying a physical file.
///
/// On Windows the pair is (volume serial number, file index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    /// Device the file lives on
    pub device: u64,
    /// Inode number on that device
    pub inode: u64,
}

impl FileId {
    /// Create an identity from raw device and inode numbers.
    #[must_use]
    pub const fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }

    /// Read the identity of the file at `path`.
    ///
    /// Returns `None` when the platform has no file identity or it cannot be
    /// read.
    #[cfg(unix)]
    #[must_use]
    pub fn for_file(_path: &Path, metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self::new(metadata.dev(), metadata.ino()))
    }

    #[cfg(windows)]
    #[must_use]
    pub fn for_file(path: &Path, _metadata: &Metadata) -> Option<Self> {
        use std::fs::OpenOptions;
        use std::os::windows::fs::OpenOptionsExt;
        use std::os::windows::io::AsRawHandle;
        use winapi::um::fileapi::{GetFileInformationByHandle, BY_HANDLE_FILE_INFORMATION};
        use winapi::um::winbase::FILE_FLAG_BACKUP_SEMANTICS;

        // no access rights needed, only a handle
        let file = match OpenOptions::new()
            .access_mode(0)
            .custom_flags(FILE_FLAG_BACKUP_SEMANTICS)
            .open(path)
        {
            Ok(file) => file,
            Err(e) => {
                log::debug!("cannot open {} for its file index: {}", path.display(), e);
                return None;
            }
        };

        // SAFETY: the handle is owned by `file` and stays open for the call;
        // the struct is plain data the call writes into.
        let info = unsafe {
            let mut info: BY_HANDLE_FILE_INFORMATION = std::mem::zeroed();
            if GetFileInformationByHandle(file.as_raw_handle().cast(), &mut info) == 0 {
                log::debug!(
                    "cannot read file index of {}: {}",
                    path.display(),
                    std::io::Error::last_os_error()
                );
                return None;
            }
            info
        };

        let index = (u64::from(info.nFileIndexHigh) << 32) | u64::from(info.nFileIndexLow);
        Some(Self::new(u64::from(info.dwVolumeSerialNumber), index))
    }

    #[cfg(not(any(unix, windows)))]
    #[must_use]
    pub fn for_file(_path: &Path, _metadata: &Metadata) -> Option<Self> {
        None
    }

    /// Whether identities can be read on this platform.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(any(unix, windows))
    }
}

/// Two optional identities denote the same file only if both are known and equal.
#[must_use]
pub fn is_same_file(a: Option<FileId>, b: Option<FileId>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}
