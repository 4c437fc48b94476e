// reencode-core/tests/pipeline_tests.rs

use reencode_core::config::CoreConfig;
use reencode_core::engine::StreamingEngine;
use reencode_core::error::CoreError;
use reencode_core::external::mocks::{MockFfmpegSpawner, MockProber, ScriptedEngine};
use reencode_core::pipeline::run_batch;
use reencode_core::reporting::NullReporter;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::fs::File;
use tempfile::tempdir;

#[test]
fn test_end_to_end_batch() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempdir()?;
    let output = tempdir()?;
    for name in ["a.mp4", "b.flv", "c.txt"] {
        File::create(input.path().join(name))?;
    }

    let mut config = CoreConfig::new(input.path().to_path_buf(), output.path().join("out"), "1M");
    config.min_length_secs = Some(5.0);
    config.validate()?;

    let prober = MockProber::new()
        .with_duration("a.mp4", Some(3.0))
        .with_duration("b.flv", Some(12.0));
    let engine = ScriptedEngine::new().creating_outputs();

    let summary = run_batch(&config, &prober, &engine, &NullReporter)?;

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.deleted, vec![input.path().join("a.mp4")]);
    assert!(summary.all_succeeded());

    assert!(!input.path().join("a.mp4").exists());
    assert!(input.path().join("b.flv").exists());
    assert!(input.path().join("c.txt").exists());

    let jobs = engine.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].input_path, input.path().join("b.flv"));
    assert_eq!(jobs[0].output_path, output.path().join("out").join("b.mp4"));
    assert_eq!(jobs[0].target_bitrate, "1M");
    assert!(output.path().join("out").join("b.mp4").exists());
    Ok(())
}

#[test]
fn test_filter_disabled_without_min_length() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempdir()?;
    let output = tempdir()?;
    File::create(input.path().join("tiny.mkv"))?;

    let config = CoreConfig::new(input.path().to_path_buf(), output.path().to_path_buf(), "1M");
    let prober = MockProber::new().with_duration("tiny.mkv", Some(0.5));
    let engine = ScriptedEngine::new();

    let summary = run_batch(&config, &prober, &engine, &NullReporter)?;

    assert!(summary.deleted.is_empty());
    assert!(input.path().join("tiny.mkv").exists());
    assert_eq!(engine.jobs().len(), 1);
    Ok(())
}

#[test]
fn test_probe_failure_aborts_before_encoding() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempdir()?;
    let output = tempdir()?;
    File::create(input.path().join("a.mkv"))?;
    File::create(input.path().join("b.mkv"))?;

    let config = CoreConfig::new(input.path().to_path_buf(), output.path().to_path_buf(), "1M");
    let prober = MockProber::new()
        .with_duration("a.mkv", Some(10.0))
        .with_failure("b.mkv", "Invalid data found when processing input");
    let engine = ScriptedEngine::new();

    let result = run_batch(&config, &prober, &engine, &NullReporter);

    assert!(matches!(result, Err(CoreError::Discovery { .. })));
    assert!(engine.jobs().is_empty());
    Ok(())
}

#[test]
fn test_streaming_batch_with_one_failure() -> Result<(), Box<dyn std::error::Error>> {
    let input = tempdir()?;
    let output = tempdir()?;
    File::create(input.path().join("good.mkv"))?;
    File::create(input.path().join("bad.mkv"))?;

    let config = CoreConfig::new(input.path().to_path_buf(), output.path().to_path_buf(), "800k");
    let prober = MockProber::new()
        .with_duration("good.mkv", Some(20.0))
        .with_duration("bad.mkv", Some(20.0));

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation(
        "good.mkv",
        vec![
            FfmpegEvent::Error("No streams found".to_string()),
            FfmpegEvent::Done,
        ],
    );
    spawner.add_exit_error_expectation("bad.mkv", Vec::new(), 1);
    let engine = StreamingEngine::new(spawner.clone(), "libx265");

    let summary = run_batch(&config, &prober, &engine, &NullReporter)?;

    assert_eq!(summary.report.len(), 2);
    assert_eq!(summary.report.success_count(), 1);
    let failed: Vec<&str> = summary.report.failed().map(|o| o.filename.as_str()).collect();
    assert_eq!(failed, vec!["bad.mkv"]);
    assert_eq!(spawner.received_calls().len(), 2);
    Ok(())
}
