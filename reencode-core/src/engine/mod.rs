// ============================================================================
// reencode-core/src/engine/mod.rs
// ============================================================================
//
// ENCODE ENGINES: Uniform job execution over different ffmpeg strategies
//
// KEY COMPONENTS:
// - EncodeJob: one file's encode task (input, output, bitrate, pass count)
// - EncodeEngine: runs a job to completion and reports success or failure
// - StreamingEngine: single pass driven by ffmpeg-sidecar's event stream
// - TwoPassEngine: two blocking ffmpeg runs with captured stderr
//
// The orchestrator only sees `&dyn EncodeEngine`, so fan-out, join-all and
// failure isolation are shared by both strategies.

use crate::config::{CoreConfig, EncodeMode};
use crate::error::EncodeError;
use crate::external::{SidecarSpawner, SystemProcessRunner};
use crate::reporting::Reporter;

use std::path::PathBuf;

pub mod streaming;
pub mod two_pass;

pub use streaming::StreamingEngine;
pub use two_pass::TwoPassEngine;

/// One file's encode task. Owned by the orchestrator for the duration of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
    /// Filename relative to the input directory
    pub filename: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub target_bitrate: String,
    pub passes: u8,
    /// Source duration, used to turn ffmpeg timestamps into percentages
    pub duration_secs: Option<f64>,
}

/// Something that can run an `EncodeJob` against an external encoder.
pub trait EncodeEngine: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    /// Number of encoder invocations per job.
    fn passes(&self) -> u8;

    /// Runs the job to completion. Never panics on encoder failure; the
    /// error is returned so the orchestrator can record it.
    fn encode(&self, job: &EncodeJob, reporter: &dyn Reporter) -> Result<(), EncodeError>;
}

/// Builds the production engine for the configured mode.
pub fn engine_for_config(config: &CoreConfig) -> Box<dyn EncodeEngine> {
    match config.mode {
        EncodeMode::Streaming => Box::new(StreamingEngine::new(
            SidecarSpawner,
            config.video_codec.clone(),
        )),
        EncodeMode::TwoPass => Box::new(TwoPassEngine::new(
            SystemProcessRunner,
            config.video_codec.clone(),
            config.audio_bitrate.clone(),
        )),
    }
}
