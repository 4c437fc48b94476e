// ============================================================================
// reencode-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg, ffprobe and child processes
//
// This module encapsulates every call into an external program. Each
// capability sits behind a trait so the pipeline can be exercised with
// in-memory fakes from `mocks`.
//
// KEY COMPONENTS:
// - MediaProber / FfprobeProber: read-only metadata inspection
// - FfmpegSpawner / SidecarSpawner: event-streaming ffmpeg runs
// - ProcessRunner / SystemProcessRunner: blocking runs capturing stdout/stderr
// - check_dependency: verifies a tool can be started

use crate::error::{CoreError, CoreResult, command_start_error};

use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Traits and implementations for spawning event-streaming ffmpeg processes
pub mod ffmpeg_executor;

/// Traits and implementations for probing media metadata with ffprobe
pub mod ffprobe_executor;

/// Blocking process execution with captured output
pub mod process_runner;

/// In-memory fakes for tests, only compiled with the "test-mocks" feature
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{FfprobeProber, MediaProber};
pub use process_runner::{ProcessOutput, ProcessRunner, SystemProcessRunner};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that `cmd_name` can be started by running it with `-version`.
///
/// Only the ability to spawn the program matters; its exit status is ignored.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(command_start_error(cmd_name, e))
        }
    }
}

/// Null sink used as the output of analysis passes.
pub fn null_output_path() -> &'static str {
    if cfg!(windows) { "NUL" } else { "/dev/null" }
}
