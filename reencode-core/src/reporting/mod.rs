//! User-facing progress reporting.
//!
//! Pipeline stages emit structured updates through the [`Reporter`] trait.
//! The CLI picks a human-readable [`TerminalReporter`] or a line-delimited
//! [`JsonReporter`]; library callers that want silence use [`NullReporter`].
//! Diagnostic detail goes through the `log` facade, not through reporters.

use crate::utils::{format_bytes, format_elapsed};

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde_json::json;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Result of scanning the input directory.
#[derive(Clone, Debug)]
pub struct DiscoverySummary {
    pub input_dir: String,
    pub formats: String,
    pub found: usize,
}

/// A file removed by the duration filter.
#[derive(Clone, Debug)]
pub struct DeletedFile {
    pub path: String,
    pub duration_secs: f64,
    pub min_length_secs: f64,
}

/// Batch start metadata.
#[derive(Clone, Debug)]
pub struct BatchStartInfo {
    pub total_files: usize,
    pub file_list: Vec<String>,
    pub output_dir: String,
    pub mode: String,
    pub workers: usize,
}

/// A job was handed to the engine.
#[derive(Clone, Debug)]
pub struct JobStart {
    pub filename: String,
    pub output_file: String,
    pub passes: u8,
}

/// A pass of a multi-pass job began.
#[derive(Clone, Debug)]
pub struct PassStart {
    pub filename: String,
    pub pass: u8,
    pub passes: u8,
}

/// Snapshot of a streaming job's progress.
#[derive(Clone, Debug)]
pub struct JobProgress {
    pub filename: String,
    pub percent: Option<f32>,
    pub time: String,
    pub fps: f32,
    pub speed: f32,
}

/// A job resolved, successfully or not.
#[derive(Clone, Debug)]
pub struct JobFinished {
    pub filename: String,
    pub output_file: String,
    pub elapsed: Duration,
    pub output_size: Option<u64>,
    pub error: Option<String>,
}

/// Batch completion summary.
#[derive(Clone, Debug)]
pub struct BatchSummary {
    pub total_files: usize,
    pub successful_count: usize,
    pub failed_count: usize,
    pub deleted_count: usize,
    pub total_duration: Duration,
    pub failures: Vec<(String, String)>,
}

/// Reporter interface implemented by both human-readable and JSON reporters.
///
/// Methods may be called concurrently from worker threads.
pub trait Reporter: Send + Sync {
    fn discovery_complete(&self, _summary: &DiscoverySummary) {}
    fn file_deleted(&self, _file: &DeletedFile) {}
    fn batch_started(&self, _info: &BatchStartInfo) {}
    fn job_started(&self, _job: &JobStart) {}
    fn pass_started(&self, _pass: &PassStart) {}
    fn job_progress(&self, _progress: &JobProgress) {}
    fn job_finished(&self, _job: &JobFinished) {}
    fn warning(&self, _message: &str) {}
    fn batch_complete(&self, _summary: &BatchSummary) {}
}

/// No-op reporter that discards all updates.
pub struct NullReporter;

impl Reporter for NullReporter {}

// ============================================================================
// TERMINAL REPORTER
// ============================================================================

/// Human-friendly reporter with one progress bar per running job.
pub struct TerminalReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn line(&self, text: String) {
        // MultiProgress::println is a no-op while hidden, so fall back to stdout.
        if self.multi.is_hidden() {
            println!("{}", text);
        } else {
            let _ = self.multi.println(text);
        }
    }

    fn take_bar(&self, filename: &str) -> Option<ProgressBar> {
        self.bars
            .lock()
            .ok()
            .and_then(|mut bars| bars.remove(filename))
    }
}

impl Reporter for TerminalReporter {
    fn discovery_complete(&self, summary: &DiscoverySummary) {
        println!("\n{}", style("DISCOVERY").bold().cyan());
        println!("  {:<9} {}", style("Input:").bold(), summary.input_dir);
        println!("  {:<9} {}", style("Formats:").bold(), summary.formats);
        println!("  {:<9} {}", style("Found:").bold(), summary.found);
    }

    fn file_deleted(&self, file: &DeletedFile) {
        println!(
            "  {} {} ({:.1}s < {:.1}s)",
            style("DELETED").red().bold(),
            file.path,
            file.duration_secs,
            file.min_length_secs
        );
    }

    fn batch_started(&self, info: &BatchStartInfo) {
        println!("\n{}", style("BATCH").bold().cyan());
        println!(
            "  Converting {} files -> {} ({} mode, {} workers)",
            info.total_files,
            style(&info.output_dir).bold(),
            info.mode,
            info.workers
        );
        for (idx, name) in info.file_list.iter().enumerate() {
            println!("  {}. {}", idx + 1, name);
        }
    }

    fn job_started(&self, job: &JobStart) {
        let pb = self.multi.add(ProgressBar::new(100));
        if let Ok(bar_style) =
            ProgressStyle::with_template("{prefix:<24!} [{bar:30}] {percent:>3}% | {msg}")
        {
            pb.set_style(bar_style.progress_chars("=> "));
        }
        pb.set_prefix(job.filename.clone());
        pb.set_message("starting");
        pb.enable_steady_tick(Duration::from_millis(250));
        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(job.filename.clone(), pb);
        }
    }

    fn pass_started(&self, pass: &PassStart) {
        if let Ok(bars) = self.bars.lock() {
            if let Some(pb) = bars.get(&pass.filename) {
                pb.set_message(format!("pass {}/{}", pass.pass, pass.passes));
                if pass.passes > 0 {
                    let step = 100 / u64::from(pass.passes);
                    pb.set_position(step * u64::from(pass.pass - 1));
                }
            }
        }
    }

    fn job_progress(&self, progress: &JobProgress) {
        if let Ok(bars) = self.bars.lock() {
            if let Some(pb) = bars.get(&progress.filename) {
                if let Some(percent) = progress.percent {
                    pb.set_position(percent as u64);
                }
                pb.set_message(format!(
                    "{} speed {:.1}x, fps {:.1}",
                    progress.time, progress.speed, progress.fps
                ));
            }
        }
    }

    fn job_finished(&self, job: &JobFinished) {
        if let Some(pb) = self.take_bar(&job.filename) {
            pb.finish_and_clear();
        }
        match &job.error {
            None => {
                let size = job
                    .output_size
                    .map(format_bytes)
                    .unwrap_or_else(|| "unknown size".to_string());
                self.line(format!(
                    "  {} {} -> {} ({}, {})",
                    style("✓").green().bold(),
                    job.filename,
                    job.output_file,
                    size,
                    format_elapsed(job.elapsed)
                ));
            }
            Some(error) => {
                self.line(format!(
                    "  {} {}: {}",
                    style("✗").red().bold(),
                    style(&job.filename).bold(),
                    error
                ));
            }
        }
    }

    fn warning(&self, message: &str) {
        self.line(format!("{}", style(format!("WARN: {}", message)).yellow().bold()));
    }

    fn batch_complete(&self, summary: &BatchSummary) {
        println!("\n{}", style("BATCH SUMMARY").bold().cyan());
        let headline = format!(
            "{} of {} succeeded",
            summary.successful_count, summary.total_files
        );
        if summary.failed_count == 0 {
            println!("  {}", style(headline).green().bold());
        } else {
            println!("  {}", style(headline).red().bold());
        }
        if summary.deleted_count > 0 {
            println!("  Deleted (too short): {}", summary.deleted_count);
        }
        println!("  Time: {}", format_elapsed(summary.total_duration));
        for (file, error) in &summary.failures {
            println!("  - {}: {}", style(file).red(), error);
        }
    }
}

// ============================================================================
// JSON REPORTER
// ============================================================================

/// Newline-delimited JSON events for machine consumers.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
    last_progress_bucket: Mutex<HashMap<String, i32>>,
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            last_progress_bucket: Mutex::new(HashMap::new()),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_value(&self, value: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", value);
            let _ = writer.flush();
        }
    }
}

impl Reporter for JsonReporter {
    fn discovery_complete(&self, summary: &DiscoverySummary) {
        self.write_value(json!({
            "type": "discovery_complete",
            "input_dir": summary.input_dir,
            "formats": summary.formats,
            "found": summary.found,
            "timestamp": Self::timestamp(),
        }));
    }

    fn file_deleted(&self, file: &DeletedFile) {
        self.write_value(json!({
            "type": "file_deleted",
            "path": file.path,
            "duration_seconds": file.duration_secs,
            "min_length_seconds": file.min_length_secs,
            "timestamp": Self::timestamp(),
        }));
    }

    fn batch_started(&self, info: &BatchStartInfo) {
        self.write_value(json!({
            "type": "batch_started",
            "total_files": info.total_files,
            "files": info.file_list,
            "output_dir": info.output_dir,
            "mode": info.mode,
            "workers": info.workers,
            "timestamp": Self::timestamp(),
        }));
    }

    fn job_started(&self, job: &JobStart) {
        if let Ok(mut buckets) = self.last_progress_bucket.lock() {
            buckets.insert(job.filename.clone(), -1);
        }
        self.write_value(json!({
            "type": "job_started",
            "filename": job.filename,
            "output_file": job.output_file,
            "passes": job.passes,
            "timestamp": Self::timestamp(),
        }));
    }

    fn pass_started(&self, pass: &PassStart) {
        self.write_value(json!({
            "type": "pass_started",
            "filename": pass.filename,
            "pass": pass.pass,
            "passes": pass.passes,
            "timestamp": Self::timestamp(),
        }));
    }

    fn job_progress(&self, progress: &JobProgress) {
        let Some(percent) = progress.percent else {
            return;
        };
        let bucket = (percent as i32) / 5;
        if let Ok(mut buckets) = self.last_progress_bucket.lock() {
            let last = buckets.entry(progress.filename.clone()).or_insert(-1);
            if bucket <= *last && percent < 99.0 {
                return;
            }
            *last = bucket;
        }
        self.write_value(json!({
            "type": "job_progress",
            "filename": progress.filename,
            "percent": percent,
            "time": progress.time,
            "fps": progress.fps,
            "speed": progress.speed,
            "timestamp": Self::timestamp(),
        }));
    }

    fn job_finished(&self, job: &JobFinished) {
        if let Ok(mut buckets) = self.last_progress_bucket.lock() {
            buckets.remove(&job.filename);
        }
        self.write_value(json!({
            "type": "job_finished",
            "filename": job.filename,
            "output_file": job.output_file,
            "success": job.error.is_none(),
            "error": job.error,
            "output_size": job.output_size,
            "duration_seconds": job.elapsed.as_secs_f64(),
            "timestamp": Self::timestamp(),
        }));
    }

    fn warning(&self, message: &str) {
        self.write_value(json!({
            "type": "warning",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn batch_complete(&self, summary: &BatchSummary) {
        let failures: Vec<_> = summary
            .failures
            .iter()
            .map(|(file, error)| json!({ "filename": file, "error": error }))
            .collect();
        self.write_value(json!({
            "type": "batch_complete",
            "total_files": summary.total_files,
            "successful_count": summary.successful_count,
            "failed_count": summary.failed_count,
            "deleted_count": summary.deleted_count,
            "total_duration_seconds": summary.total_duration.as_secs(),
            "failures": failures,
            "timestamp": Self::timestamp(),
        }));
    }
}
