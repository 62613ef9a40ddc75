//! Size-bucketed file index.
//!
//! # Overview
//!
//! Files of different sizes can never be byte-for-byte duplicates, so both
//! the keep and the delete collections are indexed by size. A bucket keeps
//! insertion order and accepts repeated paths as-is.
//!
//! Records are shared (`Rc`) between the index and the snapshots handed out
//! by [`SizeIndex::get`], so a prefix cache filled while comparing a snapshot
//! entry is visible through the index afterwards.
//!
//! # Example
//!
//! ```
//! use rmdups::duplicates::SizeIndex;
//! use rmdups::scanner::FileRecord;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let mut index = SizeIndex::new("DeleteIndex");
//! for (path, size) in [("/a", 10), ("/b", 10), ("/c", 20)] {
//!     let record = FileRecord::new(PathBuf::from(path), size, None, SystemTime::now()).unwrap();
//!     index.add(record);
//! }
//!
//! assert_eq!(index.get(10).len(), 2);
//! assert!(index.get(30).is_empty());
//! assert_eq!(index.sizes_descending().collect::<Vec<_>>(), vec![20, 10]);
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::scanner::{FileRecord, ScanError};

/// Mapping from file size to the records observed with that size.
#[derive(Debug)]
pub struct SizeIndex {
    label: String,
    buckets: BTreeMap<u64, Vec<Rc<FileRecord>>>,
}

impl SizeIndex {
    /// Create an empty index. `label` only appears in diagnostics.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            buckets: BTreeMap::new(),
        }
    }

    /// Diagnostic name of this index.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append a record to the bucket for its size.
    pub fn add(&mut self, record: FileRecord) {
        let size = record.size;
        let bucket = self.buckets.entry(size).or_default();
        log::trace!(
            "added to {} index, size={} size_count={}, path={}",
            self.label,
            size,
            bucket.len() + 1,
            record.path.display()
        );
        bucket.push(Rc::new(record));
    }

    /// Snapshot of the bucket for `size`; empty if no file has that size.
    ///
    /// The returned vector is owned by the caller. Reordering it does not
    /// affect the index.
    #[must_use]
    pub fn get(&self, size: u64) -> Vec<Rc<FileRecord>> {
        self.buckets.get(&size).cloned().unwrap_or_default()
    }

    /// Whether any record has this size.
    #[must_use]
    pub fn contains_size(&self, size: u64) -> bool {
        self.buckets.contains_key(&size)
    }

    /// Bucket sizes from largest to smallest.
    pub fn sizes_descending(&self) -> impl Iterator<Item = u64> + '_ {
        self.buckets.keys().rev().copied()
    }

    /// Number of distinct sizes.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Whether the index holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of the sizes of all records.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.buckets
            .iter()
            .map(|(size, files)| size * files.len() as u64)
            .sum()
    }
}

/// Decides whether a record should be indexed.
pub trait IndexFilter {
    /// Return `true` to index `record`.
    fn accepts(&self, record: &FileRecord) -> bool;
}

/// Filter that indexes everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl IndexFilter for AcceptAll {
    fn accepts(&self, _record: &FileRecord) -> bool {
        true
    }
}

/// Accepts only records whose size appears in another index.
///
/// Used while loading keep sources: a kept file whose size matches no
/// delete candidate can never be compared, so it is not worth holding.
#[derive(Debug, Clone, Copy)]
pub struct KeepSizeFilter<'a> {
    delete_index: &'a SizeIndex,
}

impl<'a> KeepSizeFilter<'a> {
    /// Filter against the sizes present in `delete_index`.
    #[must_use]
    pub fn new(delete_index: &'a SizeIndex) -> Self {
        Self { delete_index }
    }
}

impl IndexFilter for KeepSizeFilter<'_> {
    fn accepts(&self, record: &FileRecord) -> bool {
        if self.delete_index.contains_size(record.size) {
            return true;
        }
        log::trace!(
            "keep file of no interest, no delete files of same size: {}",
            record.path.display()
        );
        false
    }
}

/// Counters from loading one source into an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Records added to the index
    pub indexed: usize,
    /// Records rejected by the filter
    pub filtered: usize,
    /// Entries skipped as input anomalies
    pub skipped: usize,
}

/// Add every acceptable record from `records` to `index`.
///
/// Input anomalies are logged as warnings and skipped.
pub fn index_records<I, F>(index: &mut SizeIndex, records: I, filter: &F) -> LoadStats
where
    I: IntoIterator<Item = Result<FileRecord, ScanError>>,
    F: IndexFilter + ?Sized,
{
    let mut stats = LoadStats::default();
    for result in records {
        match result {
            Ok(record) => {
                if filter.accepts(&record) {
                    index.add(record);
                    stats.indexed += 1;
                } else {
                    log::debug!("not allowed by filter: {}", record.path.display());
                    stats.filtered += 1;
                }
            }
            Err(e) => {
                log::warn!("{}", e);
                stats.skipped += 1;
            }
        }
    }
    stats
}
