// ============================================================================
// reencode-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Event-streaming ffmpeg process abstraction
//
// KEY COMPONENTS:
// - FfmpegProcess: an active ffmpeg run that yields events and an exit status
// - FfmpegSpawner: creates FfmpegProcess instances from FfmpegCommand builders
// - SidecarSpawner: concrete implementation backed by ffmpeg-sidecar
//
// The streaming engine is generic over FfmpegSpawner, so tests can replay
// scripted event sequences instead of starting ffmpeg.

use crate::error::{EncodeError, spawn_error};

use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::process::ExitStatus;

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Feeds every event emitted by the process to `handler`, in order.
    fn handle_events<F>(&mut self, handler: F) -> Result<(), EncodeError>
    where
        F: FnMut(FfmpegEvent);

    /// Waits for the process to exit.
    fn wait(&mut self) -> Result<ExitStatus, EncodeError>;
}

/// Trait representing something that can spawn an `FfmpegProcess`.
pub trait FfmpegSpawner: Send + Sync {
    type Process: FfmpegProcess;

    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> Result<Self::Process, EncodeError>;
}

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> Result<(), EncodeError>
    where
        F: FnMut(FfmpegEvent),
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            EncodeError::Engine {
                diagnostics: format!("cannot read ffmpeg output: {e}"),
            }
        })?;
        for event in iterator {
            handler(event);
        }
        Ok(())
    }

    fn wait(&mut self) -> Result<ExitStatus, EncodeError> {
        self.0.wait().map_err(|e| EncodeError::Engine {
            diagnostics: format!("failed waiting for ffmpeg: {e}"),
        })
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> Result<Self::Process, EncodeError> {
        log::debug!("Spawning ffmpeg: {:?}", cmd);
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| spawn_error("ffmpeg", e))
    }
}
