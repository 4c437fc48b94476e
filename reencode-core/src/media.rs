//! Media metadata records produced by probing.
//!
//! A [`MediaMetadata`] is the structured result of inspecting one file. Only
//! `format.duration` drives pipeline decisions; the remaining fields are kept
//! for logging and reporting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discovered files keyed by filename relative to the input directory.
pub type MediaMap = BTreeMap<String, MediaMetadata>;

/// Container-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatSection {
    /// Duration in seconds, `None` when the container does not report one
    pub duration: Option<f64>,
    /// File size in bytes
    pub size: Option<u64>,
}

/// Per-stream metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSection {
    pub index: i64,
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Structured metadata for a single media file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub format: FormatSection,
    #[serde(default)]
    pub streams: Vec<StreamSection>,
}

impl MediaMetadata {
    /// Metadata with only a duration, mostly useful for tests and fakes.
    pub fn with_duration(duration: Option<f64>) -> Self {
        Self {
            format: FormatSection {
                duration,
                size: None,
            },
            streams: Vec::new(),
        }
    }

    /// Duration in seconds as reported under the `format` section.
    pub fn duration(&self) -> Option<f64> {
        self.format.duration
    }

    /// First video stream, if any.
    pub fn video_stream(&self) -> Option<&StreamSection> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_video_stream() {
        let metadata = MediaMetadata {
            format: FormatSection::default(),
            streams: vec![
                StreamSection {
                    index: 0,
                    codec_type: Some("audio".to_string()),
                    codec_name: Some("aac".to_string()),
                    ..Default::default()
                },
                StreamSection {
                    index: 1,
                    codec_type: Some("video".to_string()),
                    codec_name: Some("h264".to_string()),
                    width: Some(1280),
                    height: Some(720),
                },
            ],
        };

        let video = metadata.video_stream().unwrap();
        assert_eq!(video.index, 1);
        assert_eq!(video.codec_name.as_deref(), Some("h264"));
    }

    #[test]
    fn deserializes_without_streams() {
        let metadata: MediaMetadata =
            serde_json::from_str(r#"{"format": {"duration": 12.5, "size": null}}"#).unwrap();
        assert_eq!(metadata.duration(), Some(12.5));
        assert!(metadata.streams.is_empty());
    }
}
