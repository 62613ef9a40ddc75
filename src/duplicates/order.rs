//! Ordering of keep candidates for one delete candidate.
//!
//! Keep candidates of the right size are tried in the order produced here,
//! so the likeliest cheap match comes first. The order is a chain of tiers,
//! each preferring candidates that share something with the delete
//! candidate (the "pivot"):
//!
//! 1. same physical file (device and inode)
//! 2. same base name
//! 3. same modification time
//! 4. path, byte-wise lexicographic
//!
//! The first tier that tells two candidates apart decides. The sort is
//! stable, so candidates equal on every tier keep their index order.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::scanner::FileRecord;

/// One tier: compares two candidates relative to the pivot.
type Tier = fn(&FileRecord, &FileRecord, &FileRecord) -> Ordering;

const TIERS: [Tier; 4] = [same_file_first, same_name_first, same_mtime_first, by_path];

/// Compare keep candidates `a` and `b` for the delete candidate `pivot`.
///
/// `Ordering::Less` means `a` should be tried before `b`.
#[must_use]
pub fn rank(pivot: &FileRecord, a: &FileRecord, b: &FileRecord) -> Ordering {
    TIERS
        .iter()
        .map(|tier| tier(pivot, a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Sort `candidates` in place into trial order for `pivot`.
pub fn order_candidates(pivot: &FileRecord, candidates: &mut [Rc<FileRecord>]) {
    candidates.sort_by(|a, b| rank(pivot, a, b));
    if log::log_enabled!(log::Level::Trace) {
        let order: Vec<_> = candidates
            .iter()
            .map(|c| c.path.display().to_string())
            .collect();
        log::trace!(
            "for delete file {} sorted list is {}",
            pivot.path.display(),
            order.join(",")
        );
    }
}

/// Candidates for which `matches` holds sort first.
fn prefer(a_matches: bool, b_matches: bool) -> Ordering {
    b_matches.cmp(&a_matches)
}

fn same_file_first(pivot: &FileRecord, a: &FileRecord, b: &FileRecord) -> Ordering {
    prefer(pivot.is_same_file(a), pivot.is_same_file(b))
}

fn same_name_first(pivot: &FileRecord, a: &FileRecord, b: &FileRecord) -> Ordering {
    prefer(pivot.name == a.name, pivot.name == b.name)
}

fn same_mtime_first(pivot: &FileRecord, a: &FileRecord, b: &FileRecord) -> Ordering {
    prefer(pivot.modified == a.modified, pivot.modified == b.modified)
}

fn by_path(_pivot: &FileRecord, a: &FileRecord, b: &FileRecord) -> Ordering {
    a.path.as_os_str().cmp(b.path.as_os_str())
}
