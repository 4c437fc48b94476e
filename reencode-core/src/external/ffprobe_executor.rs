//! FFprobe integration for reading container metadata.
//!
//! Probing is read-only: it never creates, moves or deletes files.

use crate::error::ProbeError;
use crate::media::{FormatSection, MediaMetadata, StreamSection};

use ffprobe::{FfProbe, FfProbeError, ffprobe};
use std::path::Path;

/// Read-only metadata inspection of a media file.
pub trait MediaProber: Send + Sync {
    /// Returns the metadata of `path` or a `ProbeError` when the container
    /// cannot be read.
    fn probe(&self, path: &Path) -> Result<MediaMetadata, ProbeError>;
}

/// `MediaProber` backed by the `ffprobe` binary via the `ffprobe` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfprobeProber;

impl FfprobeProber {
    pub fn new() -> Self {
        Self
    }
}

impl MediaProber for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<MediaMetadata, ProbeError> {
        log::debug!("Running ffprobe (via crate) on: {}", path.display());
        match ffprobe(path) {
            Ok(probe) => {
                let mut metadata = convert_probe(&probe);
                if metadata.format.size.is_none() {
                    metadata.format.size = std::fs::metadata(path).ok().map(|m| m.len());
                }
                Ok(metadata)
            }
            Err(err) => {
                log::error!("ffprobe failed on {}: {:?}", path.display(), err);
                Err(map_ffprobe_error(err))
            }
        }
    }
}

fn convert_probe(probe: &FfProbe) -> MediaMetadata {
    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite());

    let streams = probe
        .streams
        .iter()
        .map(|s| StreamSection {
            index: s.index,
            codec_type: s.codec_type.clone(),
            codec_name: s.codec_name.clone(),
            width: s.width,
            height: s.height,
        })
        .collect();

    MediaMetadata {
        format: FormatSection {
            duration,
            size: None,
        },
        streams,
    }
}

fn map_ffprobe_error(err: FfProbeError) -> ProbeError {
    match err {
        FfProbeError::Io(io_err) => ProbeError::Spawn(io_err),
        FfProbeError::Status(output) => ProbeError::Failed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        },
        FfProbeError::Deserialize(err) => ProbeError::Parse(err.to_string()),
        #[allow(unreachable_patterns)]
        other => ProbeError::Other(format!("Unknown ffprobe error: {other:?}")),
    }
}
