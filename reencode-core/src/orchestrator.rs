// ============================================================================
// reencode-core/src/orchestrator.rs
// ============================================================================
//
// TRANSCODE ORCHESTRATOR: Fan-out of encode jobs with per-job isolation
//
// KEY COMPONENTS:
// - output_file_name: maps an input name to its `.mp4` output name
// - JobOutcome / BatchReport: per-job results collected for the whole batch
// - transcode_all: runs every job on a dedicated rayon pool and joins them all
//
// A failed job is recorded in its JobOutcome. Nothing cancels sibling jobs,
// and transcode_all returns only after every job has resolved. Jobs that
// would write an output path already claimed by an earlier job never run.

use crate::config::{CoreConfig, OUTPUT_EXTENSION};
use crate::engine::{EncodeEngine, EncodeJob};
use crate::error::EncodeError;
use crate::media::MediaMap;
use crate::reporting::{JobFinished, JobStart, Reporter};
use crate::utils::get_file_size;

use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Output file name for `filename`: same stem, `.mp4` extension.
///
/// ```rust
/// use reencode_core::output_file_name;
///
/// assert_eq!(output_file_name("holiday.mkv"), "holiday.mp4");
/// assert_eq!(output_file_name("already.mp4"), "already.mp4");
/// assert_eq!(output_file_name("raw"), "raw.mp4");
/// ```
pub fn output_file_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    format!("{}.{}", stem, OUTPUT_EXTENSION)
}

/// Builds one job per kept file, in file name order.
pub fn build_jobs(files: &MediaMap, config: &CoreConfig, passes: u8) -> Vec<EncodeJob> {
    files
        .iter()
        .map(|(name, metadata)| EncodeJob {
            filename: name.clone(),
            input_path: config.input_dir.join(name),
            output_path: config.output_dir.join(output_file_name(name)),
            target_bitrate: config.target_bitrate.clone(),
            passes,
            duration_secs: metadata.duration(),
        })
        .collect()
}

/// Splits `jobs` into those that may run and those whose output path is
/// already claimed by an earlier job (for example `a.mkv` and `a.flv`).
///
/// The first job in order keeps the path. Each rejected job is paired with the
/// file name of the job that claimed it.
pub fn split_output_conflicts(jobs: Vec<EncodeJob>) -> (Vec<EncodeJob>, Vec<(EncodeJob, String)>) {
    let mut claimed: HashMap<PathBuf, String> = HashMap::new();
    let mut runnable = Vec::with_capacity(jobs.len());
    let mut conflicts = Vec::new();

    for job in jobs {
        if let Some(owner) = claimed.get(&job.output_path).cloned() {
            conflicts.push((job, owner));
        } else {
            claimed.insert(job.output_path.clone(), job.filename.clone());
            runnable.push(job);
        }
    }
    (runnable, conflicts)
}

/// Terminal state of one encode job.
#[derive(Debug)]
pub struct JobOutcome {
    pub filename: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub elapsed: Duration,
    pub result: Result<(), EncodeError>,
}

impl JobOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every outcome of one batch, in job order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| o.succeeded())
    }

    pub fn failed(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.succeeded())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

fn run_job(job: &EncodeJob, engine: &dyn EncodeEngine, reporter: &dyn Reporter) -> JobOutcome {
    log::info!(
        "Converting {} -> {} ({} pass(es))",
        job.input_path.display(),
        job.output_path.display(),
        job.passes
    );
    reporter.job_started(&JobStart {
        filename: job.filename.clone(),
        output_file: job.output_path.display().to_string(),
        passes: job.passes,
    });

    let start = Instant::now();
    let result = engine.encode(job, reporter);
    let elapsed = start.elapsed();

    match &result {
        Ok(()) => log::info!("Finished {} in {:.1}s", job.filename, elapsed.as_secs_f64()),
        Err(e) => log::error!("Failed to convert {}: {}", job.input_path.display(), e),
    }
    reporter.job_finished(&JobFinished {
        filename: job.filename.clone(),
        output_file: job.output_path.display().to_string(),
        elapsed,
        output_size: result
            .is_ok()
            .then(|| get_file_size(&job.output_path))
            .flatten(),
        error: result.as_ref().err().map(ToString::to_string),
    });

    JobOutcome {
        filename: job.filename.clone(),
        input_path: job.input_path.clone(),
        output_path: job.output_path.clone(),
        elapsed,
        result,
    }
}

fn reject_conflict(job: EncodeJob, claimed_by: String, reporter: &dyn Reporter) -> JobOutcome {
    let error = EncodeError::OutputConflict {
        output: job.output_path.clone(),
        claimed_by,
    };
    log::error!("Skipping {}: {}", job.filename, error);
    reporter.warning(&format!("Skipping {}: {}", job.filename, error));
    reporter.job_finished(&JobFinished {
        filename: job.filename.clone(),
        output_file: job.output_path.display().to_string(),
        elapsed: Duration::ZERO,
        output_size: None,
        error: Some(error.to_string()),
    });

    JobOutcome {
        filename: job.filename,
        input_path: job.input_path,
        output_path: job.output_path,
        elapsed: Duration::ZERO,
        result: Err(error),
    }
}

/// Runs one encode job per entry of `files` and waits for all of them.
///
/// Jobs run on a rayon pool sized by [`CoreConfig::worker_count`]. When the
/// pool cannot be created the jobs run one after another on the caller's
/// thread instead.
pub fn transcode_all(
    files: &MediaMap,
    config: &CoreConfig,
    engine: &dyn EncodeEngine,
    reporter: &dyn Reporter,
) -> BatchReport {
    let (jobs, conflicts) = split_output_conflicts(build_jobs(files, config, engine.passes()));
    let start = Instant::now();
    if jobs.is_empty() {
        return BatchReport::default();
    }
    let rejected: Vec<JobOutcome> = conflicts
        .into_iter()
        .map(|(job, owner)| reject_conflict(job, owner, reporter))
        .collect();

    let workers = config.worker_count(jobs.len());
    log::debug!(
        "Running {} job(s) on {} worker(s) with the {} engine ({} logical CPUs)",
        jobs.len(),
        workers,
        engine.name(),
        num_cpus::get()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("reencode-worker-{i}"))
        .build();

    let mut outcomes = match pool {
        Ok(pool) => pool.install(|| {
            jobs.par_iter()
                .map(|job| run_job(job, engine, reporter))
                .collect::<Vec<_>>()
        }),
        Err(e) => {
            log::warn!("Failed to build worker pool ({}); running jobs sequentially", e);
            jobs.iter()
                .map(|job| run_job(job, engine, reporter))
                .collect()
        }
    };

    outcomes.extend(rejected);
    outcomes.sort_by(|a, b| a.filename.cmp(&b.filename));

    BatchReport {
        outcomes,
        elapsed: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaMetadata;

    #[test]
    fn output_name_replaces_last_extension() {
        assert_eq!(output_file_name("a.flv"), "a.mp4");
        assert_eq!(output_file_name("a.b.MKV"), "a.b.mp4");
        assert_eq!(output_file_name("noext"), "noext.mp4");
    }

    #[test]
    fn jobs_follow_config() {
        let mut files = MediaMap::new();
        files.insert("b.flv".to_string(), MediaMetadata::with_duration(Some(9.0)));
        files.insert("a.mkv".to_string(), MediaMetadata::with_duration(None));
        let config = CoreConfig::new(PathBuf::from("/in"), PathBuf::from("/out"), "3M");

        let jobs = build_jobs(&files, &config, 2);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].filename, "a.mkv");
        assert_eq!(jobs[0].input_path, PathBuf::from("/in/a.mkv"));
        assert_eq!(jobs[0].output_path, PathBuf::from("/out/a.mp4"));
        assert_eq!(jobs[1].duration_secs, Some(9.0));
        assert!(jobs.iter().all(|j| j.passes == 2 && j.target_bitrate == "3M"));
    }

    #[test]
    fn later_jobs_lose_a_shared_output_path() {
        let mut files = MediaMap::new();
        for name in ["a.flv", "a.mkv", "a.mp4", "b.mkv"] {
            files.insert(name.to_string(), MediaMetadata::with_duration(Some(5.0)));
        }
        let config = CoreConfig::new(PathBuf::from("/in"), PathBuf::from("/out"), "3M");

        let (runnable, conflicts) = split_output_conflicts(build_jobs(&files, &config, 1));

        let names: Vec<&str> = runnable.iter().map(|j| j.filename.as_str()).collect();
        assert_eq!(names, vec!["a.flv", "b.mkv"]);
        let rejected: Vec<(&str, &str)> = conflicts
            .iter()
            .map(|(job, owner)| (job.filename.as_str(), owner.as_str()))
            .collect();
        assert_eq!(rejected, vec![("a.mkv", "a.flv"), ("a.mp4", "a.flv")]);
    }
}
