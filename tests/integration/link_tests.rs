use rmdups::actions::{Disposer, DispositionConfig};
use rmdups::duplicates::{index_records, AcceptAll, Duplicate, DuplicateResolver, SizeIndex};
use rmdups::scanner::{FileId, IndexFileReader, Walker};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::tempdir;

fn index_dir(label: &str, dir: &Path) -> SizeIndex {
    let mut index = SizeIndex::new(label);
    index_records(&mut index, Walker::new(dir).unwrap().walk(), &AcceptAll);
    index
}

fn index_list<P: AsRef<Path>>(label: &str, paths: &[P]) -> SizeIndex {
    let listing: String = paths
        .iter()
        .map(|p| format!("{}\n", p.as_ref().display()))
        .collect();
    let mut index = SizeIndex::new(label);
    index_records(
        &mut index,
        IndexFileReader::new(Cursor::new(listing), label),
        &AcceptAll,
    );
    index
}

#[cfg(any(unix, windows))]
#[test]
fn test_hardlink_is_never_disposed() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("keep");
    let del = dir.path().join("del");
    fs::create_dir_all(&keep).unwrap();
    fs::create_dir_all(&del).unwrap();
    let original = keep.join("data.bin");
    fs::write(&original, b"shared inode").unwrap();
    let link = del.join("data.bin");
    if let Err(e) = fs::hard_link(&original, &link) {
        eprintln!("Skipping hardlink test: failed to create hardlink: {}", e);
        return;
    }

    let config = DispositionConfig {
        delete: true,
        ..DispositionConfig::default()
    };
    let mut disposer = Disposer::new(config, Vec::new());
    let summary = DuplicateResolver::default()
        .resolve(
            &index_dir("KeepIndex", &keep),
            &index_dir("DeleteIndex", &del),
            &mut disposer,
        )
        .unwrap();

    assert!(FileId::is_supported());
    assert_eq!(summary.duplicate_files, 0);
    assert_eq!(summary.duplicate_bytes, 0);
    assert_eq!(summary.refused_same_file, 1);
    assert_eq!(summary.comparisons.total(), 0);
    assert!(link.exists());
    assert!(original.exists());
}

#[cfg(any(unix, windows))]
#[test]
fn test_same_path_in_both_lists_is_refused() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("only.txt");
    fs::write(&file, b"one copy").unwrap();

    let mut found: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(
            &index_list("KeepIndex", &[&file]),
            &index_list("DeleteIndex", &[&file]),
            &mut found,
        )
        .unwrap();

    assert!(found.is_empty());
    assert_eq!(summary.refused_same_file, 1);
}

#[cfg(unix)]
#[test]
fn test_symlink_in_keep_list_protects_target() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target.txt");
    let symlink = dir.path().join("alias.txt");
    fs::write(&target, b"real data").unwrap();
    std::os::unix::fs::symlink(&target, &symlink).unwrap();

    let mut found: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(
            &index_list("KeepIndex", &[&symlink]),
            &index_list("DeleteIndex", &[&target]),
            &mut found,
        )
        .unwrap();

    assert!(found.is_empty());
    assert_eq!(summary.refused_same_file, 1);
}

#[cfg(any(unix, windows))]
#[test]
fn test_refusal_skips_other_equal_keep_files() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.txt");
    let copy = dir.path().join("copy").join("b.txt");
    fs::create_dir_all(copy.parent().unwrap()).unwrap();
    fs::write(&file, b"payload").unwrap();
    fs::write(&copy, b"payload").unwrap();

    let mut found: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(
            &index_list("KeepIndex", &[&copy, &file]),
            &index_list("DeleteIndex", &[&file]),
            &mut found,
        )
        .unwrap();

    // The candidate is also a kept file, so it is left alone entirely.
    assert!(found.is_empty());
    assert_eq!(summary.refused_same_file, 1);
    assert_eq!(summary.comparisons.total(), 0);
}

#[cfg(unix)]
#[test]
fn test_directory_symlinks_not_followed() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("keep");
    let del = dir.path().join("del");
    fs::create_dir_all(&keep).unwrap();
    fs::create_dir_all(&del).unwrap();
    fs::write(keep.join("k.txt"), b"kept").unwrap();
    std::os::unix::fs::symlink(&keep, del.join("into-keep")).unwrap();

    let delete = index_dir("DeleteIndex", &del);
    assert!(delete.is_empty());
}
