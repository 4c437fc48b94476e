// ============================================================================
// reencode-core/src/engine/two_pass.rs
// ============================================================================
//
// TWO-PASS ENGINE: Blocking analysis pass followed by the final encode
//
// Pass 1 encodes video only to the null device and writes rate-control stats.
// Pass 2 reads those stats, re-encodes audio to AAC and writes the output with
// the moov atom up front.
//
// Pass 2 runs even when pass 1 was flagged as failed. The job then fails with
// the first pass's error; pass 2's diagnostics are appended when it failed too.

use super::{EncodeEngine, EncodeJob};
use crate::error::{EncodeError, spawn_error};
use crate::external::{ProcessRunner, null_output_path};
use crate::reporting::{PassStart, Reporter};
use crate::temp_files::{create_pass_log_dir, pass_log_prefix};

use std::ffi::OsString;
use std::path::{Path, PathBuf};

const FFMPEG: &str = "ffmpeg";
const PASSES: u8 = 2;

/// Two-pass engine over any [`ProcessRunner`].
pub struct TwoPassEngine<R: ProcessRunner> {
    runner: R,
    video_codec: String,
    audio_bitrate: String,
    scratch_dir: Option<PathBuf>,
}

impl<R: ProcessRunner> TwoPassEngine<R> {
    pub fn new(runner: R, video_codec: impl Into<String>, audio_bitrate: impl Into<String>) -> Self {
        Self {
            runner,
            video_codec: video_codec.into(),
            audio_bitrate: audio_bitrate.into(),
            scratch_dir: None,
        }
    }

    /// Places per-job pass log directories under `dir` instead of the system temp dir.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    fn run_pass(&self, job: &EncodeJob, pass: u8, passlog: &Path) -> Result<(), EncodeError> {
        let args = pass_args(
            job,
            pass,
            passlog,
            &self.video_codec,
            &self.audio_bitrate,
        );
        log::debug!(
            "{}: pass {}/{}: {} {:?}",
            job.filename,
            pass,
            PASSES,
            FFMPEG,
            args
        );

        let output = self
            .runner
            .run(FFMPEG, &args)
            .map_err(|e| spawn_error(FFMPEG, e))?;

        let stderr = output.stderr.trim();
        if output.success() && stderr.is_empty() {
            return Ok(());
        }
        Err(EncodeError::PassFailed {
            pass,
            status: output.status,
            diagnostics: stderr.to_string(),
        })
    }
}

/// Rate-control flags tying both passes to the same stats file.
fn pass_flags(video_codec: &str, pass: u8, passlog: &Path) -> Vec<OsString> {
    if video_codec == "libx265" {
        let mut params = OsString::from(format!("pass={pass}:stats="));
        params.push(passlog.as_os_str());
        params.push(".log");
        vec!["-x265-params".into(), params]
    } else {
        vec![
            "-pass".into(),
            pass.to_string().into(),
            "-passlogfile".into(),
            passlog.as_os_str().to_owned(),
        ]
    }
}

/// Arguments following the ffmpeg program name for pass `pass` (1 or 2).
pub fn pass_args(
    job: &EncodeJob,
    pass: u8,
    passlog: &Path,
    video_codec: &str,
    audio_bitrate: &str,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        job.input_path.as_os_str().to_owned(),
        "-c:v".into(),
        video_codec.into(),
        "-b:v".into(),
        job.target_bitrate.as_str().into(),
    ];
    args.extend(pass_flags(video_codec, pass, passlog));

    if pass == 1 {
        args.extend(["-an", "-f", "mp4", null_output_path()].map(OsString::from));
    } else {
        args.extend(
            ["-c:a", "aac", "-b:a", audio_bitrate, "-movflags", "+faststart"].map(OsString::from),
        );
        args.push(job.output_path.as_os_str().to_owned());
    }
    args
}

/// Merges the two pass results into the job result.
fn combine_passes(
    first: Result<(), EncodeError>,
    second: Result<(), EncodeError>,
) -> Result<(), EncodeError> {
    match (first, second) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(e)) | (Err(e), Ok(())) => Err(e),
        (
            Err(EncodeError::PassFailed {
                pass,
                status,
                diagnostics,
            }),
            Err(second),
        ) => Err(EncodeError::PassFailed {
            pass,
            status,
            diagnostics: format!("{diagnostics}; then {second}"),
        }),
        (Err(first), Err(_)) => Err(first),
    }
}

impl<R: ProcessRunner> EncodeEngine for TwoPassEngine<R> {
    fn name(&self) -> &'static str {
        "two-pass"
    }

    fn passes(&self) -> u8 {
        PASSES
    }

    fn encode(&self, job: &EncodeJob, reporter: &dyn Reporter) -> Result<(), EncodeError> {
        let scratch = create_pass_log_dir(self.scratch_dir.as_deref()).map_err(EncodeError::Setup)?;
        let passlog = pass_log_prefix(scratch.path());

        reporter.pass_started(&PassStart {
            filename: job.filename.clone(),
            pass: 1,
            passes: PASSES,
        });
        let first = self.run_pass(job, 1, &passlog);
        if let Err(e) = &first {
            log::warn!("{}: {}; running pass 2 anyway", job.filename, e);
        }

        reporter.pass_started(&PassStart {
            filename: job.filename.clone(),
            pass: 2,
            passes: PASSES,
        });
        let second = self.run_pass(job, 2, &passlog);

        combine_passes(first, second)
    }
}
