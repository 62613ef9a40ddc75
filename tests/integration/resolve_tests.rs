use filetime::{set_file_mtime, FileTime};
use rmdups::duplicates::{Comparer, Duplicate, DuplicateResolver, SizeIndex};
use rmdups::scanner::{FileRecord, Walker};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn write(dir: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
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

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("keep");
    let del = dir.path().join("del");
    fs::create_dir_all(&keep).unwrap();
    fs::create_dir_all(&del).unwrap();
    (dir, keep, del)
}

#[test]
fn test_identical_file_at_other_path() {
    let (_dir, keep, del) = setup();
    let content = vec![b'a'; 100];
    let kept = write(&keep, "a.txt", &content);
    let candidate = write(&del, "a.txt", &content);

    let mut found: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(&index_dir("KeepIndex", &keep), &index_dir("DeleteIndex", &del), &mut found)
        .unwrap();

    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.duplicate_bytes, 100);
    assert_eq!(found[0].candidate.path, candidate);
    assert_eq!(found[0].kept.path, kept);
}

#[test]
fn test_no_keep_file_of_same_size() {
    let (_dir, keep, del) = setup();
    write(&keep, "k.bin", &[0u8; 49]);
    write(&keep, "l.bin", &[0u8; 51]);
    write(&del, "d.bin", &[0u8; 50]);

    let mut found: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(&index_dir("KeepIndex", &keep), &index_dir("DeleteIndex", &del), &mut found)
        .unwrap();

    assert!(found.is_empty());
    assert_eq!(summary.duplicate_bytes, 0);
    assert_eq!(summary.comparisons.total(), 0);
}

#[test]
fn test_large_file_differing_past_prefix() {
    let (_dir, keep, del) = setup();
    let content = vec![0x5Au8; 200_000];
    let mut changed = content.clone();
    changed[150_000] ^= 0xFF;
    write(&keep, "big.bin", &content);
    write(&del, "big.bin", &changed);

    let keep_index = index_dir("KeepIndex", &keep);
    let delete_index = index_dir("DeleteIndex", &del);

    let mut found: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(&keep_index, &delete_index, &mut found)
        .unwrap();

    assert!(found.is_empty());
    assert_eq!(summary.comparisons.unequal_from_full_read, 1);
    assert_eq!(summary.comparisons.unequal_from_cache, 0);

    // Both prefixes were cached during the read and agree with each other.
    let kept = &keep_index.get(200_000)[0];
    let candidate = &delete_index.get(200_000)[0];
    assert_eq!(kept.prefix().get(), candidate.prefix().get());

    // A second pass sees matching prefixes but still has to read to the difference.
    let mut again: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(&keep_index, &delete_index, &mut again)
        .unwrap();
    assert!(again.is_empty());
    assert_eq!(summary.comparisons.prefix_agreed, 1);
}

#[test]
fn test_only_matching_candidate_reported() {
    let (_dir, keep, del) = setup();
    write(&keep, "k.bin", b"0123456789");
    let matching = write(&del, "m.bin", b"0123456789");
    write(&del, "n.bin", b"9876543210");

    let mut found: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(&index_dir("KeepIndex", &keep), &index_dir("DeleteIndex", &del), &mut found)
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].candidate.path, matching);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.duplicate_bytes, 10);
    assert_eq!(summary.candidates, 2);
}

#[test]
fn test_same_mtime_keep_file_tried_first() {
    let (_dir, keep, del) = setup();
    let candidate = write(&del, "photo.jpg", b"pixels");
    let by_path = write(&keep, "1/one.jpg", b"pixels");
    let by_mtime = write(&keep, "2/two.jpg", b"pixels");

    let stamp = FileTime::from_unix_time(1_600_000_000, 0);
    set_file_mtime(&candidate, stamp).unwrap();
    set_file_mtime(&by_mtime, stamp).unwrap();
    set_file_mtime(&by_path, FileTime::from_unix_time(1_500_000_000, 0)).unwrap();

    let mut found: Vec<Duplicate> = Vec::new();
    DuplicateResolver::default()
        .resolve(&index_dir("KeepIndex", &keep), &index_dir("DeleteIndex", &del), &mut found)
        .unwrap();

    assert_eq!(found[0].kept.path, by_mtime);
}

#[test]
fn test_same_name_keep_file_tried_first() {
    let (_dir, keep, del) = setup();
    write(&del, "report.pdf", b"content");
    write(&keep, "a/other.pdf", b"content");
    let same_name = write(&keep, "z/report.pdf", b"content");

    let mut found: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(&index_dir("KeepIndex", &keep), &index_dir("DeleteIndex", &del), &mut found)
        .unwrap();

    assert_eq!(found[0].kept.path, same_name);
    assert_eq!(summary.comparisons.total(), 1);
}

#[test]
fn test_prefix_cache_reused_across_candidates() {
    let (_dir, keep, del) = setup();
    write(&keep, "k1.bin", b"AAAA");
    write(&keep, "k2.bin", b"AAAA");
    write(&del, "d1.bin", b"BBBB");
    write(&del, "d2.bin", b"BBBB");

    let mut found: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(&index_dir("KeepIndex", &keep), &index_dir("DeleteIndex", &del), &mut found)
        .unwrap();

    assert!(found.is_empty());
    assert_eq!(summary.comparisons.unequal_from_full_read, 3);
    assert_eq!(summary.comparisons.unequal_from_cache, 1);
}

#[test]
fn test_small_equal_files_decided_from_cache() {
    let (_dir, keep, del) = setup();
    write(&keep, "k.txt", b"tiny");
    write(&del, "d.txt", b"tiny");

    let keep_index = index_dir("KeepIndex", &keep);
    let delete_index = index_dir("DeleteIndex", &del);
    let resolver = DuplicateResolver::new(Comparer::default());

    let mut first: Vec<Duplicate> = Vec::new();
    let summary = resolver.resolve(&keep_index, &delete_index, &mut first).unwrap();
    assert_eq!(summary.comparisons.equal_from_full_read, 1);

    let mut second: Vec<Duplicate> = Vec::new();
    let summary = resolver.resolve(&keep_index, &delete_index, &mut second).unwrap();
    assert_eq!(summary.comparisons.equal_from_cache, 1);
    assert_eq!(second.len(), 1);
}

#[test]
fn test_empty_files_are_duplicates() {
    let (_dir, keep, del) = setup();
    write(&keep, "empty", b"");
    write(&del, "empty", b"");

    let mut found: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(&index_dir("KeepIndex", &keep), &index_dir("DeleteIndex", &del), &mut found)
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(summary.duplicate_bytes, 0);
}

#[test]
fn test_file_grown_since_indexing_is_not_deleted() {
    let (_dir, keep, del) = setup();
    write(&keep, "k.log", b"line\n");
    let candidate = write(&del, "d.log", b"line\n");
    let delete_index = index_dir("DeleteIndex", &del);
    let keep_index = index_dir("KeepIndex", &keep);
    fs::write(&candidate, b"line\nline\n").unwrap();

    let mut found: Vec<Duplicate> = Vec::new();
    let summary = DuplicateResolver::default()
        .resolve(&keep_index, &delete_index, &mut found)
        .unwrap();

    assert!(found.is_empty());
    assert_eq!(summary.comparisons.anomalies, 1);
}

#[test]
fn test_record_sizes_come_from_stat() {
    let (_dir, _keep, del) = setup();
    let path = write(&del, "x", b"12345");
    assert_eq!(FileRecord::stat(path).unwrap().size, 5);
}
