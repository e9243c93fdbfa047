//! Diff behaviour against a canned in-memory backend.

use diffset::diff::parse_diff;
use diffset::sources::memory::MemorySource;
use diffset::sources::traits::{DiffStats, FileStats, NameStatus, StatsTotal};
use diffset::{Diff, Side};

const RAW: &str = "\
diff --git a/Cargo.toml b/Cargo.toml
index 3f1e2d4..9a8b7c6 100644
--- a/Cargo.toml
+++ b/Cargo.toml
@@ -1,3 +1,3 @@
 [package]
-version = \"0.1.0\"
+version = \"0.2.0\"
diff --git a/assets/icon.png b/assets/icon.png
Binary files a/assets/icon.png and b/assets/icon.png differ
diff --git a/scripts/run.sh b/scripts/run.sh
new file mode 100755
index 0000000..5d6e7f8
--- /dev/null
+++ b/scripts/run.sh
@@ -0,0 +1 @@
+echo hi
diff --git a/old.txt b/old.txt
deleted file mode 100644
index 1a2b3c4..0000000
--- a/old.txt
+++ /dev/null
@@ -1 +0,0 @@
-bye
";

fn source() -> MemorySource {
    let mut files = indexmap::IndexMap::new();
    files.insert(
        "Cargo.toml".to_owned(),
        FileStats {
            insertions: 1,
            deletions: 1,
        },
    );
    let mut name_status = NameStatus::new();
    name_status.insert("Cargo.toml".to_owned(), "M".to_owned());

    MemorySource::new()
        .with_full_diff(RAW)
        .with_stats(DiffStats {
            total: StatsTotal {
                files: 4,
                lines: 4,
                insertions: 2,
                deletions: 2,
            },
            files,
        })
        .with_name_status(name_status)
        .with_object("1a2b3c4", b"bye\n".to_vec())
        .with_object("5d6e7f8", b"echo hi\n".to_vec())
}

#[test]
fn test_files_in_first_seen_order() {
    let source = source();
    let diff = Diff::new(&source, Some("v1"), Some("v2"));

    let paths: Vec<&str> = diff.iter().unwrap().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["Cargo.toml", "assets/icon.png", "scripts/run.sh", "old.txt"]
    );
}

#[test]
fn test_record_fields() {
    let source = source();
    let diff = Diff::new(&source, Some("v1"), Some("v2"));

    let cargo = diff.get("Cargo.toml").unwrap();
    assert_eq!((cargo.src.as_str(), cargo.dst.as_str()), ("3f1e2d4", "9a8b7c6"));
    assert_eq!(cargo.mode, "100644");
    assert_eq!(cargo.change_type, "modified");

    let icon = diff.get("assets/icon.png").unwrap();
    assert!(icon.is_binary());
    assert_eq!((icon.src.as_str(), icon.dst.as_str(), icon.mode.as_str()), ("", "", ""));

    let script = diff.get("scripts/run.sh").unwrap();
    assert_eq!(script.change_type, "new");
    assert_eq!(script.mode, "100755");

    let old = diff.get("old.txt").unwrap();
    assert_eq!(old.change_type, "deleted");
    assert_eq!(old.mode, "100644");
}

#[test]
fn test_only_binary_file_is_flagged() {
    let source = source();
    let diff = Diff::new(&source, None, None);
    let binary: Vec<&str> = diff
        .iter()
        .unwrap()
        .filter(|f| f.is_binary())
        .map(|f| f.path.as_str())
        .collect();
    assert_eq!(binary, vec!["assets/icon.png"]);
}

#[test]
fn test_patches_reconstruct_raw_text() {
    let source = source();
    let diff = Diff::new(&source, None, None);
    let patches: Vec<&str> = diff.iter().unwrap().map(|f| f.patch.as_str()).collect();
    assert_eq!(format!("{}\n", patches.join("\n")), diff.patch().unwrap());
}

#[test]
fn test_blobs_for_added_and_deleted_files() {
    let source = source();
    let diff = Diff::new(&source, None, None);

    assert_eq!(diff.blob("scripts/run.sh", Side::Src).unwrap(), None);
    assert_eq!(
        diff.blob("scripts/run.sh", Side::Dst).unwrap(),
        Some(b"echo hi\n".to_vec())
    );
    assert_eq!(diff.blob("old.txt", Side::Src).unwrap(), Some(b"bye\n".to_vec()));
    assert_eq!(diff.blob("old.txt", Side::Dst).unwrap(), None);
    assert_eq!(source.counts().objects, 2);
}

#[test]
fn test_every_accessor_fetches_once() {
    let source = source();
    let diff = Diff::new(&source, None, None);

    for _ in 0..2 {
        assert_eq!(diff.size().unwrap(), 4);
        assert_eq!(diff.stats().unwrap().files["Cargo.toml"].insertions, 1);
        assert_eq!(diff.name_status().unwrap()["Cargo.toml"], "M");
        assert_eq!(diff.iter().unwrap().count(), 4);
        assert_eq!(diff.patch().unwrap(), RAW);
    }

    let counts = source.counts();
    assert_eq!(counts.full_diff, 1);
    assert_eq!(counts.stats, 1);
    assert_eq!(counts.name_status, 1);
}

#[test]
fn test_stats_are_independent_of_parsed_files() {
    // A stats summary that disagrees with the text is returned as-is
    let source = MemorySource::new().with_full_diff(RAW);
    let diff = Diff::new(&source, None, None);
    assert_eq!(diff.size().unwrap(), 0);
    assert_eq!(diff.iter().unwrap().len(), 4);
}

#[test]
fn test_diff_set_matches_direct_parse() {
    let source = source();
    let diff = Diff::new(&source, None, None);
    assert_eq!(diff.files().unwrap(), &parse_diff(RAW));
}
