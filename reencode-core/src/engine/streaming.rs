// ============================================================================
// reencode-core/src/engine/streaming.rs
// ============================================================================
//
// STREAMING ENGINE: Single-pass encode driven by ffmpeg-sidecar events
//
// The job's result is decided by ffmpeg's exit status alone. Error and fatal
// log lines, along with sidecar Error events that are not known chatter, are
// kept as a bounded tail so a failure carries ffmpeg's own explanation.

use super::{EncodeEngine, EncodeJob};
use crate::error::EncodeError;
use crate::external::{FfmpegProcess, FfmpegSpawner};
use crate::reporting::{JobProgress, Reporter};
use crate::utils::progress_percent;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::collections::VecDeque;

/// Maximum number of diagnostic lines retained per job.
const DIAGNOSTIC_TAIL: usize = 20;

/// Arguments following the ffmpeg program name for a streaming encode.
pub fn streaming_args(job: &EncodeJob, video_codec: &str) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        job.input_path.to_string_lossy().into_owned(),
        "-c:v".to_string(),
        video_codec.to_string(),
        "-b:v".to_string(),
        job.target_bitrate.clone(),
        "-f".to_string(),
        "mp4".to_string(),
        job.output_path.to_string_lossy().into_owned(),
    ]
}

/// Builds the sidecar command for a streaming encode.
pub fn build_streaming_command(job: &EncodeJob, video_codec: &str) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(streaming_args(job, video_codec));
    cmd
}

/// Single-pass engine over any [`FfmpegSpawner`].
pub struct StreamingEngine<S: FfmpegSpawner> {
    spawner: S,
    video_codec: String,
}

impl<S: FfmpegSpawner> StreamingEngine<S> {
    pub fn new(spawner: S, video_codec: impl Into<String>) -> Self {
        Self {
            spawner,
            video_codec: video_codec.into(),
        }
    }
}

/// Sidecar error messages that show up during normal, successful encodes.
///
/// ffmpeg-sidecar emits "No streams found" for every run whose output goes to a
/// file rather than stdout.
fn is_non_critical_ffmpeg_error(error: &str) -> bool {
    error.contains("No streams found")
        || error.contains("deprecated pixel format")
        || error.contains("No accelerated colorspace conversion")
        || error.contains("automatically inserted filter")
        || error.contains("Timestamps are unset")
        || error.contains("Queue input is backward")
        || error.contains("first frame is no keyframe")
}

#[derive(Default)]
struct Diagnostics {
    lines: VecDeque<String>,
}

impl Diagnostics {
    fn push(&mut self, line: String) {
        if self.lines.len() == DIAGNOSTIC_TAIL {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    fn render(&self) -> String {
        self.lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}

impl<S: FfmpegSpawner> EncodeEngine for StreamingEngine<S> {
    fn name(&self) -> &'static str {
        "streaming"
    }

    fn passes(&self) -> u8 {
        1
    }

    fn encode(&self, job: &EncodeJob, reporter: &dyn Reporter) -> Result<(), EncodeError> {
        let cmd = build_streaming_command(job, &self.video_codec);
        let mut process = self.spawner.spawn(cmd)?;

        let mut diagnostics = Diagnostics::default();
        process.handle_events(|event| match event {
            FfmpegEvent::Progress(progress) => {
                reporter.job_progress(&JobProgress {
                    filename: job.filename.clone(),
                    percent: progress_percent(&progress.time, job.duration_secs),
                    time: progress.time,
                    fps: progress.fps,
                    speed: progress.speed,
                });
            }
            FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) => {
                log::debug!("ffmpeg [{}]: {}", job.filename, line);
                diagnostics.push(line);
            }
            FfmpegEvent::Error(message) if is_non_critical_ffmpeg_error(&message) => {
                log::debug!("ffmpeg non-critical message for {}: {}", job.filename, message);
            }
            FfmpegEvent::Error(message) => {
                log::warn!("ffmpeg error for {}: {}", job.filename, message);
                diagnostics.push(message);
            }
            _ => {}
        })?;

        let status = process.wait()?;
        if status.success() {
            return Ok(());
        }

        let exit = status
            .code()
            .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit status {c}"));
        let rendered = diagnostics.render();
        Err(EncodeError::Engine {
            diagnostics: if rendered.is_empty() {
                format!("ffmpeg {exit}")
            } else {
                format!("ffmpeg {exit}: {rendered}")
            },
        })
    }
}
