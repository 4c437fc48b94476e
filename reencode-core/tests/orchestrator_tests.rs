// reencode-core/tests/orchestrator_tests.rs

use reencode_core::config::CoreConfig;
use reencode_core::engine::TwoPassEngine;
use reencode_core::error::EncodeError;
use reencode_core::external::mocks::{RecordingProcessRunner, ScriptedEngine};
use reencode_core::media::{MediaMap, MediaMetadata};
use reencode_core::orchestrator::transcode_all;
use reencode_core::reporting::NullReporter;
use std::path::PathBuf;
use std::time::Duration;

fn media(count: usize) -> MediaMap {
    (0..count)
        .map(|i| (format!("clip{i:02}.mkv"), MediaMetadata::with_duration(Some(60.0))))
        .collect()
}

fn config() -> CoreConfig {
    CoreConfig::new(PathBuf::from("/in"), PathBuf::from("/out"), "2M")
}

#[test]
fn test_every_job_resolves_despite_failures() {
    let files = media(6);
    let engine = ScriptedEngine::new()
        .failing("clip01.mkv")
        .failing("clip04.mkv")
        .with_delay(Duration::from_millis(20));

    let report = transcode_all(&files, &config(), &engine, &NullReporter);

    assert_eq!(report.len(), 6);
    assert_eq!(report.success_count(), 4);
    assert_eq!(report.failure_count(), 2);
    assert!(report.has_failures());

    let failed: Vec<&str> = report.failed().map(|o| o.filename.as_str()).collect();
    assert_eq!(failed, vec!["clip01.mkv", "clip04.mkv"]);
    // Every job was attempted, including those after a failure
    assert_eq!(engine.jobs().len(), 6);
}

#[test]
fn test_outcomes_carry_output_paths() {
    let mut files = MediaMap::new();
    files.insert("movie.flv".to_string(), MediaMetadata::with_duration(None));
    files.insert("other.mp4".to_string(), MediaMetadata::with_duration(Some(1.0)));
    let engine = ScriptedEngine::new();

    let report = transcode_all(&files, &config(), &engine, &NullReporter);

    let outputs: Vec<PathBuf> = report.outcomes.iter().map(|o| o.output_path.clone()).collect();
    assert_eq!(
        outputs,
        vec![PathBuf::from("/out/movie.mp4"), PathBuf::from("/out/other.mp4")]
    );
    assert!(!report.has_failures());
}

#[test]
fn test_jobs_run_concurrently_by_default() {
    let files = media(4);
    let engine = ScriptedEngine::new().with_delay(Duration::from_millis(200));

    let report = transcode_all(&files, &config(), &engine, &NullReporter);

    assert_eq!(report.success_count(), 4);
    assert!(engine.max_concurrency() > 1);
}

#[test]
fn test_max_jobs_bounds_concurrency() {
    let files = media(6);
    let mut config = config();
    config.max_jobs = Some(2);
    let engine = ScriptedEngine::new().with_delay(Duration::from_millis(30));

    let report = transcode_all(&files, &config, &engine, &NullReporter);

    assert_eq!(report.len(), 6);
    assert!(engine.max_concurrency() <= 2);
}

#[test]
fn test_empty_batch() {
    let engine = ScriptedEngine::new();
    let report = transcode_all(&MediaMap::new(), &config(), &engine, &NullReporter);
    assert!(report.is_empty());
    assert!(!report.has_failures());
}

#[test]
fn test_two_pass_runs_pass_two_after_pass_one_failure() {
    let files = media(1);
    let runner = RecordingProcessRunner::new();
    runner.push_failure(1, "Error while opening encoder");
    let engine = TwoPassEngine::new(runner.clone(), "libx265", "128k");

    let report = transcode_all(&files, &config(), &engine, &NullReporter);

    assert_eq!(runner.call_count(), 2);
    let calls = runner.calls();
    let first: Vec<String> = calls[0].1.iter().map(|a| a.to_string_lossy().into_owned()).collect();
    let second: Vec<String> = calls[1].1.iter().map(|a| a.to_string_lossy().into_owned()).collect();
    assert!(first.iter().any(|a| a.starts_with("pass=1")));
    assert!(second.iter().any(|a| a.starts_with("pass=2")));
    assert_eq!(second.last().map(String::as_str), Some("/out/clip00.mp4"));

    assert_eq!(report.failure_count(), 1);
    match &report.outcomes[0].result {
        Err(EncodeError::PassFailed { pass, status, diagnostics }) => {
            assert_eq!(*pass, 1);
            assert_eq!(*status, Some(1));
            assert!(diagnostics.contains("Error while opening encoder"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_shared_output_name_runs_only_the_first_job() {
    let mut files = MediaMap::new();
    files.insert("a.flv".to_string(), MediaMetadata::with_duration(Some(5.0)));
    files.insert("a.mkv".to_string(), MediaMetadata::with_duration(Some(5.0)));
    files.insert("b.mkv".to_string(), MediaMetadata::with_duration(Some(5.0)));
    let engine = ScriptedEngine::new();

    let report = transcode_all(&files, &config(), &engine, &NullReporter);

    let ran: Vec<String> = engine.jobs().into_iter().map(|j| j.filename).collect();
    assert!(ran.contains(&"a.flv".to_string()));
    assert!(!ran.contains(&"a.mkv".to_string()));
    assert_eq!(ran.len(), 2);

    let names: Vec<&str> = report.outcomes.iter().map(|o| o.filename.as_str()).collect();
    assert_eq!(names, vec!["a.flv", "a.mkv", "b.mkv"]);
    assert_eq!(report.success_count(), 2);
    match &report.outcomes[1].result {
        Err(EncodeError::OutputConflict { output, claimed_by }) => {
            assert_eq!(output, &PathBuf::from("/out/a.mp4"));
            assert_eq!(claimed_by, "a.flv");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
