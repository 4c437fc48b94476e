//! Implementation of the 'run' subcommand.
//!
//! Loads the configuration file, applies command-line overrides, installs
//! logging, checks that ffmpeg and ffprobe are available and then hands the
//! batch to `reencode_core::run_batch`.

use crate::cli::RunArgs;
use crate::error::{CliResult, EXIT_JOBS_FAILED, EXIT_SUCCESS};
use crate::logging::init_logging;

use reencode_core::config::config_base_dir;
use reencode_core::{
    ConfigFile, CoreConfig, CoreError, FfprobeProber, JsonReporter, PipelineSummary, Reporter,
    TerminalReporter, check_dependency, engine_for_config, run_batch,
};

use anyhow::Context;
use log::{debug, info};
use std::path::PathBuf;

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    JobsFailed(usize),
}

impl RunOutcome {
    pub fn from_summary(summary: &PipelineSummary) -> Self {
        match summary.report.failure_count() {
            0 => RunOutcome::Success,
            n => RunOutcome::JobsFailed(n),
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            RunOutcome::Success => EXIT_SUCCESS,
            RunOutcome::JobsFailed(_) => EXIT_JOBS_FAILED,
        }
    }
}

/// Builds the validated batch configuration from the config file and flags.
pub fn load_config(args: &RunArgs) -> CliResult<CoreConfig> {
    let file = ConfigFile::load(&args.config)?;
    let mut config = file.into_core_config(&config_base_dir(&args.config));

    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(jobs) = args.jobs {
        config.max_jobs = Some(jobs);
    }

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", args.config.display()))?;
    Ok(config)
}

/// Log directory for this run, `None` when file logging is disabled.
fn resolve_log_dir(args: &RunArgs, config: &CoreConfig) -> Option<PathBuf> {
    if args.no_log {
        return None;
    }
    Some(
        args.log_dir
            .clone()
            .unwrap_or_else(|| config.output_dir.join("logs")),
    )
}

/// Runs the `run` command to completion.
pub fn run_command(args: RunArgs, verbose: bool) -> CliResult<RunOutcome> {
    let config = load_config(&args)?;

    let log_dir = resolve_log_dir(&args, &config);
    if let Some(path) = init_logging(verbose, log_dir.as_deref())? {
        info!("Logging to {}", path.display());
    }
    debug!("Configuration: {:?}", config);

    if !config.input_dir.is_dir() {
        return Err(CoreError::PathError(format!(
            "Input folder does not exist: {}",
            config.input_dir.display()
        ))
        .into());
    }

    for tool in ["ffprobe", "ffmpeg"] {
        check_dependency(tool).with_context(|| format!("{tool} is required to run a batch"))?;
    }

    let engine = engine_for_config(&config);
    let reporter: Box<dyn Reporter> = if args.progress_json {
        Box::new(JsonReporter::new())
    } else {
        Box::new(TerminalReporter::new())
    };

    let summary = run_batch(&config, &FfprobeProber::new(), engine.as_ref(), reporter.as_ref())
        .context("Batch aborted")?;

    let outcome = RunOutcome::from_summary(&summary);
    if let RunOutcome::JobsFailed(count) = outcome {
        log::warn!("{} of {} job(s) failed", count, summary.report.len());
    }
    Ok(outcome)
}
