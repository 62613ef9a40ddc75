//! Duplicate detection.
//!
//! - [`index`]: size-bucketed indexes of keep and delete candidates
//! - [`compare`]: byte-wise comparison with per-file prefix caches
//! - [`order`]: trial order of keep candidates for a delete candidate
//! - [`resolver`]: the search tying them together

pub mod compare;
pub mod index;
pub mod order;
pub mod resolver;

pub use compare::{CompareError, Comparer, Comparison, PREFIX_CACHE_SIZE, READ_CHUNK_SIZE};
pub use index::{index_records, AcceptAll, IndexFilter, KeepSizeFilter, LoadStats, SizeIndex};
pub use order::{order_candidates, rank};
pub use resolver::{CompareTallies, Duplicate, DuplicateHandler, DuplicateResolver, ResolveSummary};
