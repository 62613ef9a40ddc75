//! Byte-for-byte content comparison with per-file prefix caching.
//!
//! # Overview
//!
//! [`Comparer::compare`] decides whether two same-size files hold identical
//! bytes. It never hashes: it reads both files side by side in
//! [`READ_CHUNK_SIZE`] chunks and stops at the first differing chunk.
//!
//! While reading, the first [`PREFIX_CACHE_SIZE`] bytes of each file are
//! captured into that file's [`PrefixCache`](crate::scanner::PrefixCache),
//! once. Later comparisons against other candidates of the same size use the
//! caches to answer without I/O:
//!
//! - both caches filled and different: the files differ
//! - both caches filled, equal, and each covering the whole file: the files
//!   are equal
//! - both caches filled and equal but the files are longer than the cache:
//!   inconclusive, the files are read in full
//!
//! # Anomalies
//!
//! If one file ends before the other the size metadata is stale (the file
//! changed since it was indexed). That is reported as
//! [`CompareError::LengthMismatch`]; callers must treat it as "not equal".

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::scanner::FileRecord;

/// Default number of leading bytes cached per file.
pub const PREFIX_CACHE_SIZE: usize = 1024;

/// Default chunk size for reading file contents.
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// How a comparison reached its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Both prefix caches cover the whole files and are equal.
    EqualFromCache,
    /// Both prefix caches are filled and differ.
    UnequalFromCache,
    /// Both files were read to the end and matched.
    EqualFromFullRead {
        /// Filled, equal prefix caches were checked first but were too short
        cache_checked: bool,
    },
    /// A differing chunk was found while reading.
    UnequalFromFullRead {
        /// Filled, equal prefix caches were checked first but were too short
        cache_checked: bool,
    },
}

impl Comparison {
    /// Whether the files are equal.
    #[must_use]
    pub fn is_equal(self) -> bool {
        matches!(
            self,
            Self::EqualFromCache | Self::EqualFromFullRead { .. }
        )
    }

    /// Whether the verdict came from the prefix caches alone.
    #[must_use]
    pub fn from_cache(self) -> bool {
        matches!(self, Self::EqualFromCache | Self::UnequalFromCache)
    }
}

/// Inconclusive comparisons. Never fatal; treat as "not equal".
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// A file could not be opened or read.
    #[error("I/O error comparing {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// One file ended while the other still produced data.
    #[error(
        "when comparing, file '{shorter}' ended but file '{longer}' produced more data, \
         not same length. File changed?"
    )]
    LengthMismatch {
        /// File that reached end of stream first
        shorter: PathBuf,
        /// File that still had data
        longer: PathBuf,
    },
}

/// Content comparer with fixed cache and chunk sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparer {
    prefix_capacity: usize,
    chunk_size: usize,
}

impl Default for Comparer {
    fn default() -> Self {
        Self {
            prefix_capacity: PREFIX_CACHE_SIZE,
            chunk_size: READ_CHUNK_SIZE,
        }
    }
}

impl Comparer {
    /// Create a comparer with custom sizes.
    ///
    /// `chunk_size` is clamped to at least 1 byte.
    #[must_use]
    pub fn new(prefix_capacity: usize, chunk_size: usize) -> Self {
        Self {
            prefix_capacity,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Number of leading bytes cached per file.
    #[must_use]
    pub fn prefix_capacity(&self) -> usize {
        self.prefix_capacity
    }

    /// Chunk size used for full reads.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Compare two records already known to have the same size.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError`] when a file cannot be read or the live file
    /// lengths disagree. Either way the pair must be treated as unequal.
    pub fn compare(&self, a: &FileRecord, b: &FileRecord) -> Result<Comparison, CompareError> {
        debug_assert_eq!(a.size, b.size, "compare called on records of different size");
        log::debug!("comparing '{}' and '{}'", a.path.display(), b.path.display());

        let mut cache_checked = false;
        if let (Some(prefix_a), Some(prefix_b)) = (a.prefix().get(), b.prefix().get()) {
            if prefix_a != prefix_b {
                return Ok(Comparison::UnequalFromCache);
            }
            if covers_file(prefix_a, a) && covers_file(prefix_b, b) {
                return Ok(Comparison::EqualFromCache);
            }
            cache_checked = true;
        }

        let equal = self.compare_contents(a, b)?;
        Ok(if equal {
            Comparison::EqualFromFullRead { cache_checked }
        } else {
            Comparison::UnequalFromFullRead { cache_checked }
        })
    }

    /// Read both files side by side, filling unfilled prefix caches.
    fn compare_contents(&self, a: &FileRecord, b: &FileRecord) -> Result<bool, CompareError> {
        let mut file_a = open(&a.path)?;
        let mut file_b = open(&b.path)?;

        let mut fill_a = PrefixFill::new(a, self.prefix_capacity);
        let mut fill_b = PrefixFill::new(b, self.prefix_capacity);

        let mut buf_a = vec![0u8; self.chunk_size];
        let mut buf_b = vec![0u8; self.chunk_size];

        loop {
            let len = read_up_to(&mut file_a, &mut buf_a).map_err(|e| io_error(&a.path, e))?;
            if len == 0 {
                // `a` is exhausted: `b` must be too
                let extra = read_up_to(&mut file_b, &mut buf_b[..1])
                    .map_err(|e| io_error(&b.path, e))?;
                if extra > 0 {
                    return Err(CompareError::LengthMismatch {
                        shorter: a.path.clone(),
                        longer: b.path.clone(),
                    });
                }
                fill_a.finish();
                fill_b.finish();
                return Ok(true);
            }

            let got =
                read_up_to(&mut file_b, &mut buf_b[..len]).map_err(|e| io_error(&b.path, e))?;
            if got < len {
                return Err(CompareError::LengthMismatch {
                    shorter: b.path.clone(),
                    longer: a.path.clone(),
                });
            }

            fill_a.feed(&buf_a[..len]);
            fill_b.feed(&buf_b[..len]);

            if buf_a[..len] != buf_b[..len] {
                fill_a.settle(&mut file_a);
                fill_b.settle(&mut file_b);
                return Ok(false);
            }
        }
    }
}

/// Whether a filled prefix holds the whole file.
fn covers_file(prefix: &[u8], record: &FileRecord) -> bool {
    prefix.len() as u64 == record.size
}

/// Accumulates a record's leading bytes until its cache can be filled.
///
/// Inactive when the record's cache is already filled. A cache meant to hold
/// the whole file is only filled after end of stream confirms the file still
/// has its recorded size.
struct PrefixFill<'a> {
    record: &'a FileRecord,
    target: usize,
    whole_file: bool,
    seen: u64,
    buf: Option<Vec<u8>>,
}

impl<'a> PrefixFill<'a> {
    fn new(record: &'a FileRecord, capacity: usize) -> Self {
        let target = usize::try_from(record.size).map_or(capacity, |size| size.min(capacity));
        let buf = (!record.prefix().is_filled()).then(|| Vec::with_capacity(target));
        Self {
            record,
            target,
            whole_file: target as u64 == record.size,
            seen: 0,
            buf,
        }
    }

    /// Append the next bytes of the file.
    ///
    /// A partial prefix is committed as soon as `target` bytes are held.
    fn feed(&mut self, bytes: &[u8]) {
        self.seen += bytes.len() as u64;
        if let Some(buf) = self.buf.as_mut() {
            let wanted = self.target.saturating_sub(buf.len());
            buf.extend_from_slice(&bytes[..wanted.min(bytes.len())]);
            if !self.whole_file && buf.len() == self.target {
                self.commit();
            }
        }
    }

    /// Called at a clean end of stream; fills the cache if the file had
    /// exactly its recorded length.
    fn finish(&mut self) {
        if self.seen == self.target as u64 {
            self.commit();
        }
    }

    /// Called when reading stops early; checks for end of stream itself.
    ///
    /// Errors only cost the cache entry.
    fn settle<R: Read>(&mut self, reader: &mut R) {
        if !self.whole_file || self.buf.is_none() || self.seen != self.target as u64 {
            return;
        }
        let mut tail = [0u8; 1];
        if matches!(read_up_to(reader, &mut tail), Ok(0)) {
            self.commit();
        }
    }

    fn commit(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.record.prefix().fill(buf);
        }
    }
}

fn open(path: &Path) -> Result<File, CompareError> {
    File::open(path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: io::Error) -> CompareError {
    CompareError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Fill `buf` as far as possible, stopping early only at end of stream.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
