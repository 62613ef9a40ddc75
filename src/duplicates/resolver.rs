//! Duplicate resolution: matching delete candidates against kept files.
//!
//! # Algorithm
//!
//! Sizes present in the delete index are visited from largest to smallest.
//! For each delete candidate of that size, in index order:
//!
//! 1. the kept files of the same size are put in trial order
//!    ([`order_candidates`](super::order::order_candidates))
//! 2. if any kept file is the same physical file as the candidate, the
//!    candidate is refused with a warning and nothing is compared
//! 3. otherwise kept files are compared in order until the first equal one;
//!    that pair is handed to the [`DuplicateHandler`] and counted
//!
//! A candidate with no equal kept file is simply not a duplicate.
//!
//! Comparison anomalies are logged and counted, and the pair is treated as
//! unequal. Handler errors are fatal and end the run.

use std::rc::Rc;

use super::compare::{Comparer, Comparison};
use super::index::SizeIndex;
use super::order::order_candidates;
use crate::scanner::FileRecord;

/// A delete candidate confirmed to duplicate a kept file.
#[derive(Debug, Clone)]
pub struct Duplicate {
    /// The file that may be disposed of
    pub candidate: Rc<FileRecord>,
    /// The kept file with identical content
    pub kept: Rc<FileRecord>,
}

impl Duplicate {
    /// Size of the duplicate in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.candidate.size
    }
}

/// Receives each confirmed duplicate as soon as it is found.
pub trait DuplicateHandler {
    /// Error that aborts resolution.
    type Error;

    /// Act on one duplicate.
    ///
    /// # Errors
    ///
    /// Any error stops the run immediately.
    fn handle(&mut self, duplicate: &Duplicate) -> Result<(), Self::Error>;
}

/// Collects duplicates without acting on them.
impl DuplicateHandler for Vec<Duplicate> {
    type Error = std::convert::Infallible;

    fn handle(&mut self, duplicate: &Duplicate) -> Result<(), Self::Error> {
        self.push(duplicate.clone());
        Ok(())
    }
}

/// How comparisons were decided during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareTallies {
    /// Equal, decided from prefix caches alone
    pub equal_from_cache: usize,
    /// Unequal, decided from prefix caches alone
    pub unequal_from_cache: usize,
    /// Equal after reading both files
    pub equal_from_full_read: usize,
    /// Unequal after reading both files
    pub unequal_from_full_read: usize,
    /// Full reads whose filled prefix caches agreed but were too short to decide
    pub prefix_agreed: usize,
    /// Inconclusive comparisons (I/O errors, length changes)
    pub anomalies: usize,
}

impl CompareTallies {
    /// Count one verdict.
    pub fn record(&mut self, comparison: Comparison) {
        match comparison {
            Comparison::EqualFromCache => self.equal_from_cache += 1,
            Comparison::UnequalFromCache => self.unequal_from_cache += 1,
            Comparison::EqualFromFullRead { cache_checked } => {
                self.equal_from_full_read += 1;
                self.prefix_agreed += usize::from(cache_checked);
            }
            Comparison::UnequalFromFullRead { cache_checked } => {
                self.unequal_from_full_read += 1;
                self.prefix_agreed += usize::from(cache_checked);
            }
        }
    }

    /// Total comparisons attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.equal_from_cache
            + self.unequal_from_cache
            + self.equal_from_full_read
            + self.unequal_from_full_read
            + self.anomalies
    }
}

/// Totals for a resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Duplicates handed to the handler
    pub duplicate_files: usize,
    /// Combined size of those duplicates
    pub duplicate_bytes: u64,
    /// Delete candidates examined
    pub candidates: usize,
    /// Candidates refused because they are a kept file
    pub refused_same_file: usize,
    /// Comparison verdict counters
    pub comparisons: CompareTallies,
}

/// Drives the duplicate search over a keep and a delete index.
#[derive(Debug, Clone, Default)]
pub struct DuplicateResolver {
    comparer: Comparer,
}

impl DuplicateResolver {
    /// Create a resolver using `comparer` for content checks.
    #[must_use]
    pub fn new(comparer: Comparer) -> Self {
        Self { comparer }
    }

    /// Find every delete candidate that duplicates a kept file.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `handler`; nothing after it is
    /// processed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rmdups::duplicates::{Duplicate, DuplicateResolver, SizeIndex};
    ///
    /// let keep = SizeIndex::new("KeepIndex");
    /// let delete = SizeIndex::new("DeleteIndex");
    /// // ... fill both indexes ...
    ///
    /// let mut found: Vec<Duplicate> = Vec::new();
    /// let summary = DuplicateResolver::default()
    ///     .resolve(&keep, &delete, &mut found)
    ///     .unwrap();
    /// println!("{} duplicates, {} bytes", summary.duplicate_files, summary.duplicate_bytes);
    /// ```
    pub fn resolve<H: DuplicateHandler>(
        &self,
        keep: &SizeIndex,
        delete: &SizeIndex,
        handler: &mut H,
    ) -> Result<ResolveSummary, H::Error> {
        let mut summary = ResolveSummary::default();

        for size in delete.sizes_descending() {
            log::trace!("comparing size: {}", size);
            let candidates = delete.get(size);
            let kept = keep.get(size);
            summary.candidates += candidates.len();

            for candidate in candidates {
                let Some(duplicate) = self.match_candidate(&candidate, kept.clone(), &mut summary)
                else {
                    continue;
                };
                handler.handle(&duplicate)?;
                summary.duplicate_files += 1;
                summary.duplicate_bytes += duplicate.size();
            }
        }

        Ok(summary)
    }

    /// Find the first kept file equal to `candidate`, if any.
    fn match_candidate(
        &self,
        candidate: &Rc<FileRecord>,
        mut kept: Vec<Rc<FileRecord>>,
        summary: &mut ResolveSummary,
    ) -> Option<Duplicate> {
        if kept.is_empty() {
            return None;
        }
        order_candidates(candidate, &mut kept);

        // The whole candidate is refused, not just the matching kept entry.
        if let Some(same) = kept.iter().find(|k| candidate.is_same_file(k)) {
            log::warn!(
                "refuse to delete file '{}': it is the same file as to be kept file '{}'",
                candidate.path.display(),
                same.path.display()
            );
            summary.refused_same_file += 1;
            return None;
        }

        for keep_file in kept {
            match self.comparer.compare(candidate, &keep_file) {
                Ok(comparison) => {
                    summary.comparisons.record(comparison);
                    if comparison.is_equal() {
                        return Some(Duplicate {
                            candidate: Rc::clone(candidate),
                            kept: keep_file,
                        });
                    }
                }
                Err(e) => {
                    log::warn!("{}", e);
                    summary.comparisons.anomalies += 1;
                }
            }
        }
        None
    }
}
