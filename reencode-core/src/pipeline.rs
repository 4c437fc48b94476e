// ============================================================================
// reencode-core/src/pipeline.rs
// ============================================================================
//
// BATCH PIPELINE: discovery -> duration filter -> transcode
//
// run_batch is the end-to-end entry point used by the CLI. Stages run in
// order for the whole batch, so every file is discovered before it is
// filtered and filtered before it is encoded.

use crate::config::CoreConfig;
use crate::discovery::discover;
use crate::engine::EncodeEngine;
use crate::error::{CoreError, CoreResult};
use crate::external::MediaProber;
use crate::filter::filter_by_min_duration;
use crate::orchestrator::{BatchReport, transcode_all};
use crate::reporting::{BatchStartInfo, BatchSummary, DiscoverySummary, Reporter};

use std::path::PathBuf;
use std::time::Instant;

/// What a completed batch did.
#[derive(Debug)]
pub struct PipelineSummary {
    /// Files found and probed
    pub discovered: usize,
    /// Files removed by the duration filter
    pub deleted: Vec<PathBuf>,
    pub report: BatchReport,
}

impl PipelineSummary {
    /// True when every encode job succeeded.
    pub fn all_succeeded(&self) -> bool {
        !self.report.has_failures()
    }
}

/// Runs one batch from discovery to the last encode.
///
/// Returns an error only for failures that stop the whole run: an unreadable
/// input directory, an output directory that cannot be created, or a file
/// that cannot be probed. Encode failures are collected in the report.
pub fn run_batch(
    config: &CoreConfig,
    prober: &dyn MediaProber,
    engine: &dyn EncodeEngine,
    reporter: &dyn Reporter,
) -> CoreResult<PipelineSummary> {
    let start = Instant::now();
    log::info!("Starting video conversion");

    std::fs::create_dir_all(&config.output_dir).map_err(|e| {
        CoreError::PathError(format!(
            "Cannot create output directory {}: {}",
            config.output_dir.display(),
            e
        ))
    })?;

    let discovered = discover(&config.input_dir, &config.formats, prober)?;
    let discovered_count = discovered.len();
    reporter.discovery_complete(&DiscoverySummary {
        input_dir: config.input_dir.display().to_string(),
        formats: config.formats.to_string(),
        found: discovered_count,
    });

    let (kept, deleted) = match config.duration_threshold() {
        Some(min) => {
            log::info!("Removing files shorter than {}s", min);
            let outcome = filter_by_min_duration(discovered, &config.input_dir, min, reporter);
            (outcome.kept, outcome.deleted)
        }
        None => (discovered, Vec::new()),
    };

    reporter.batch_started(&BatchStartInfo {
        total_files: kept.len(),
        file_list: kept.keys().cloned().collect(),
        output_dir: config.output_dir.display().to_string(),
        mode: engine.name().to_string(),
        workers: config.worker_count(kept.len()),
    });

    let report = transcode_all(&kept, config, engine, reporter);

    reporter.batch_complete(&BatchSummary {
        total_files: report.len(),
        successful_count: report.success_count(),
        failed_count: report.failure_count(),
        deleted_count: deleted.len(),
        total_duration: start.elapsed(),
        failures: report
            .failed()
            .filter_map(|o| {
                o.result
                    .as_ref()
                    .err()
                    .map(|e| (o.filename.clone(), e.to_string()))
            })
            .collect(),
    });
    log::info!(
        "Finished video conversion: {} succeeded, {} failed, {} deleted",
        report.success_count(),
        report.failure_count(),
        deleted.len()
    );

    Ok(PipelineSummary {
        discovered: discovered_count,
        deleted,
        report,
    })
}
