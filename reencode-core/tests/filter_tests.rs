// reencode-core/tests/filter_tests.rs

use reencode_core::filter::filter_by_min_duration;
use reencode_core::media::{MediaMap, MediaMetadata};
use reencode_core::reporting::{DeletedFile, Reporter};
use std::fs::File;
use std::sync::Mutex;
use tempfile::tempdir;

#[derive(Default)]
struct RecordingReporter {
    deleted: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl Reporter for RecordingReporter {
    fn file_deleted(&self, file: &DeletedFile) {
        self.deleted.lock().unwrap().push(file.path.clone());
    }

    fn warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}

fn media(entries: &[(&str, Option<f64>)]) -> MediaMap {
    entries
        .iter()
        .map(|(name, d)| (name.to_string(), MediaMetadata::with_duration(*d)))
        .collect()
}

#[test]
fn test_short_files_are_deleted_and_dropped() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let root = dir.path();
    for name in ["short.mp4", "long.mkv", "edge.flv", "unknown.mkv"] {
        File::create(root.join(name))?;
    }
    let files = media(&[
        ("short.mp4", Some(3.0)),
        ("long.mkv", Some(12.0)),
        ("edge.flv", Some(5.0)),
        ("unknown.mkv", None),
    ]);
    let reporter = RecordingReporter::default();

    let outcome = filter_by_min_duration(files, root, 5.0, &reporter);

    let kept: Vec<&str> = outcome.kept.keys().map(String::as_str).collect();
    assert_eq!(kept, vec!["edge.flv", "long.mkv", "unknown.mkv"]);
    assert_eq!(outcome.deleted, vec![root.join("short.mp4")]);
    assert!(outcome.failed_deletions.is_empty());

    assert!(!root.join("short.mp4").exists());
    assert!(root.join("long.mkv").exists());
    assert!(root.join("edge.flv").exists());
    assert!(root.join("unknown.mkv").exists());
    assert_eq!(reporter.deleted.lock().unwrap().len(), 1);
    Ok(())
}

#[test]
fn test_unknown_duration_kept_for_any_threshold() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("mystery.mkv"))?;
    let reporter = RecordingReporter::default();

    let outcome = filter_by_min_duration(
        media(&[("mystery.mkv", None)]),
        dir.path(),
        1.0e9,
        &reporter,
    );
    assert!(outcome.kept.contains_key("mystery.mkv"));
    assert!(dir.path().join("mystery.mkv").exists());
    Ok(())
}

#[test]
fn test_deletion_failure_is_non_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    // The file is absent on disk, so removal fails.
    let files = media(&[("ghost.mp4", Some(1.0)), ("keep.mp4", Some(60.0))]);
    let reporter = RecordingReporter::default();

    let outcome = filter_by_min_duration(files, dir.path(), 5.0, &reporter);

    assert!(!outcome.kept.contains_key("ghost.mp4"));
    assert!(outcome.kept.contains_key("keep.mp4"));
    assert!(outcome.deleted.is_empty());
    assert_eq!(outcome.failed_deletions, vec![dir.path().join("ghost.mp4")]);

    let warnings = reporter.warnings.lock().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("ghost.mp4"));
    Ok(())
}
