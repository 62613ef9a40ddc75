use rmdups::actions::{Action, DisposeError, Disposer, DispositionConfig};
use rmdups::duplicates::{DuplicateResolver, SizeIndex};
use rmdups::scanner::Walker;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Tree {
    _dir: TempDir,
    keep: PathBuf,
    del: PathBuf,
}

impl Tree {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let keep = dir.path().join("keep");
        let del = dir.path().join("del");
        fs::create_dir_all(&keep).unwrap();
        fs::create_dir_all(&del).unwrap();
        Self {
            _dir: dir,
            keep,
            del,
        }
    }

    fn keep_file(&self, name: &str, content: &[u8]) -> PathBuf {
        write(&self.keep, name, content)
    }

    fn del_file(&self, name: &str, content: &[u8]) -> PathBuf {
        write(&self.del, name, content)
    }

    fn indexes(&self) -> (SizeIndex, SizeIndex) {
        (index_dir("KeepIndex", &self.keep), index_dir("DeleteIndex", &self.del))
    }
}

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn index_dir(label: &str, dir: &Path) -> SizeIndex {
    let mut index = SizeIndex::new(label);
    for record in Walker::new(dir).unwrap().walk() {
        index.add(record.unwrap());
    }
    index
}

#[test]
fn test_report_only_leaves_files() {
    let tree = Tree::new();
    tree.keep_file("a", b"abc");
    let dup = tree.del_file("a", b"abc");
    let (keep, delete) = tree.indexes();

    let mut disposer = Disposer::new(DispositionConfig::default(), Vec::new());
    let summary = DuplicateResolver::default()
        .resolve(&keep, &delete, &mut disposer)
        .unwrap();

    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(disposer.counts().reported, 1);
    assert!(dup.exists());
}

#[test]
fn test_delete_removes_only_duplicates() {
    let tree = Tree::new();
    let kept = tree.keep_file("k", b"same bytes");
    let dup = tree.del_file("d1", b"same bytes");
    let unique = tree.del_file("d2", b"diff bytes");
    let (keep, delete) = tree.indexes();

    let config = DispositionConfig {
        delete: true,
        ..DispositionConfig::default()
    };
    let mut disposer = Disposer::new(config, Vec::new());
    let summary = DuplicateResolver::default()
        .resolve(&keep, &delete, &mut disposer)
        .unwrap();

    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.duplicate_bytes, 10);
    assert!(!dup.exists());
    assert!(unique.exists());
    assert!(kept.exists());
}

#[test]
fn test_wipe_removes_duplicate() {
    let tree = Tree::new();
    let kept = tree.keep_file("k", &[1u8; 150_000]);
    let dup = tree.del_file("d", &[1u8; 150_000]);
    let (keep, delete) = tree.indexes();

    let config = DispositionConfig {
        wipe: true,
        wipe_chunk_size: 4096,
        ..DispositionConfig::default()
    };
    let mut disposer = Disposer::new(config, Vec::new());
    DuplicateResolver::default()
        .resolve(&keep, &delete, &mut disposer)
        .unwrap();

    assert!(!dup.exists());
    assert_eq!(fs::read(&kept).unwrap(), vec![1u8; 150_000]);
    assert_eq!(disposer.counts().wiped, 1);
}

#[test]
fn test_print0_lists_duplicates_largest_first() {
    let tree = Tree::new();
    tree.keep_file("small", b"s");
    tree.keep_file("large", b"large");
    let small = tree.del_file("small", b"s");
    let large = tree.del_file("large", b"large");
    let (keep, delete) = tree.indexes();

    let config = DispositionConfig {
        print_nul: true,
        ..DispositionConfig::default()
    };
    let mut disposer = Disposer::new(config, Vec::new());
    DuplicateResolver::default()
        .resolve(&keep, &delete, &mut disposer)
        .unwrap();

    let out = String::from_utf8(disposer.into_inner()).unwrap();
    assert_eq!(out, format!("{}\0{}\0", large.display(), small.display()));
}

#[test]
fn test_dispose_order_print_before_delete() {
    let tree = Tree::new();
    tree.keep_file("k", b"xyz");
    let dup = tree.del_file("d", b"xyz");
    let (keep, delete) = tree.indexes();

    let config = DispositionConfig {
        print_lf: true,
        delete: true,
        ..DispositionConfig::default()
    };
    let mut disposer = Disposer::new(config, Vec::new());
    let candidate = &delete.get(3)[0];
    let kept = &keep.get(3)[0];
    let disposition = disposer
        .dispose(&rmdups::duplicates::Duplicate {
            candidate: candidate.clone(),
            kept: kept.clone(),
        })
        .unwrap();

    assert_eq!(disposition.actions, vec![Action::PrintedLf, Action::Deleted]);
    assert_eq!(disposition.path, dup);
    assert!(!dup.exists());
}

#[cfg(unix)]
#[test]
fn test_failing_command_aborts_run() {
    let tree = Tree::new();
    tree.keep_file("k1", b"first-file");
    tree.keep_file("k2", b"2nd");
    let first = tree.del_file("d1", b"first-file");
    let second = tree.del_file("d2", b"2nd");
    let (keep, delete) = tree.indexes();

    let config = DispositionConfig {
        commands: vec!["false".parse().unwrap()],
        delete: true,
        ..DispositionConfig::default()
    };
    let mut disposer = Disposer::new(config, Vec::new());
    let result = DuplicateResolver::default().resolve(&keep, &delete, &mut disposer);

    assert!(matches!(result, Err(DisposeError::Command(_))));
    assert!(first.exists());
    assert!(second.exists());
    assert_eq!(disposer.counts().deleted, 0);
}

#[cfg(unix)]
#[test]
fn test_command_receives_path() {
    let tree = Tree::new();
    tree.keep_file("k", b"move me");
    let dup = tree.del_file("d", b"move me");
    let moved = tree.keep.parent().unwrap().join("moved");
    let (keep, delete) = tree.indexes();

    let config = DispositionConfig {
        commands: vec![format!("mv {{}} {}", moved.display()).parse().unwrap()],
        ..DispositionConfig::default()
    };
    let mut disposer = Disposer::new(config, Vec::new());
    DuplicateResolver::default()
        .resolve(&keep, &delete, &mut disposer)
        .unwrap();

    assert!(!dup.exists());
    assert_eq!(fs::read(&moved).unwrap(), b"move me");
}

#[test]
fn test_candidate_removed_before_disposal_is_fatal() {
    let tree = Tree::new();
    tree.keep_file("k", b"gone soon");
    let dup = tree.del_file("d", b"gone soon");
    let (keep, delete) = tree.indexes();

    // Compare first so the candidate is already confirmed, then remove it.
    let mut found = Vec::new();
    DuplicateResolver::default()
        .resolve(&keep, &delete, &mut found)
        .unwrap();
    fs::remove_file(&dup).unwrap();

    let config = DispositionConfig {
        delete: true,
        ..DispositionConfig::default()
    };
    let mut disposer = Disposer::new(config, Vec::new());
    assert!(disposer.dispose(&found[0]).is_err());
}
