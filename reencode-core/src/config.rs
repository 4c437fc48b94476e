// ============================================================================
// reencode-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Batch configuration and defaults
//
// KEY COMPONENTS:
// - ConfigFile: serde view of the JSON configuration file (camelCase keys)
// - CoreConfig: immutable, validated configuration passed to every stage
// - EncodeMode: selects the streaming single-pass or blocking two-pass engine
//
// USAGE:
// The CLI loads a ConfigFile once at startup, applies command-line overrides
// and hands a CoreConfig by reference to discovery, filtering and the
// transcode orchestrator. Nothing in the library reads ambient global state.

use crate::error::{CoreError, CoreResult};
use crate::formats::FormatAllowList;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Video codec passed to ffmpeg when the configuration does not name one.
pub const DEFAULT_VIDEO_CODEC: &str = "libx265";

/// Audio bitrate used by the second pass of a two-pass encode.
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Container extension forced on every output file.
pub const OUTPUT_EXTENSION: &str = "mp4";

// ============================================================================
// ENCODE MODE
// ============================================================================

/// Engine invocation strategy used for every job of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncodeMode {
    /// One asynchronous ffmpeg run per file, driven by its event stream.
    #[default]
    Streaming,
    /// Two blocking ffmpeg runs per file: analysis pass, then final pass.
    TwoPass,
}

impl EncodeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            EncodeMode::Streaming => "streaming",
            EncodeMode::TwoPass => "two-pass",
        }
    }

    /// Number of encoder invocations per job.
    pub const fn passes(self) -> u8 {
        match self {
            EncodeMode::Streaming => 1,
            EncodeMode::TwoPass => 2,
        }
    }
}

impl fmt::Display for EncodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodeMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "streaming" | "single-pass" | "single" => Ok(EncodeMode::Streaming),
            "two-pass" | "twopass" | "2pass" => Ok(EncodeMode::TwoPass),
            other => Err(CoreError::Config(format!(
                "Unknown encode mode '{}'. Valid options: streaming, two-pass",
                other
            ))),
        }
    }
}

// ============================================================================
// CONFIGURATION FILE
// ============================================================================

/// Bitrate as written in the config file: `"2M"` or `2000000`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BitrateValue {
    Text(String),
    Number(u64),
}

impl BitrateValue {
    fn into_bitrate(self) -> String {
        match self {
            BitrateValue::Text(text) => text.trim().to_string(),
            BitrateValue::Number(n) => n.to_string(),
        }
    }
}

/// Raw contents of the JSON configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub input_folder: PathBuf,
    pub output_folder: PathBuf,
    pub target_bitrate: BitrateValue,
    #[serde(default)]
    pub min_length_sec: Option<f64>,
    #[serde(default)]
    pub ignore_file_formats: Vec<String>,
    #[serde(default)]
    pub mode: Option<EncodeMode>,
    #[serde(default)]
    pub max_jobs: Option<usize>,
    #[serde(default)]
    pub video_codec: Option<String>,
    #[serde(default)]
    pub audio_bitrate: Option<String>,
}

impl ConfigFile {
    /// Parses configuration JSON.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a configuration file from disk.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "Cannot read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&contents)
    }

    /// Converts the file view into a `CoreConfig`, resolving relative folders
    /// against `base_dir` (normally the directory holding the config file).
    pub fn into_core_config(self, base_dir: &Path) -> CoreConfig {
        let formats = FormatAllowList::default().without(&self.ignore_file_formats);
        CoreConfig {
            input_dir: resolve_against(base_dir, self.input_folder),
            output_dir: resolve_against(base_dir, self.output_folder),
            target_bitrate: self.target_bitrate.into_bitrate(),
            min_length_secs: self.min_length_sec,
            formats,
            mode: self.mode.unwrap_or_default(),
            max_jobs: self.max_jobs,
            video_codec: self
                .video_codec
                .unwrap_or_else(|| DEFAULT_VIDEO_CODEC.to_string()),
            audio_bitrate: self
                .audio_bitrate
                .unwrap_or_else(|| DEFAULT_AUDIO_BITRATE.to_string()),
        }
    }
}

/// Directory that relative folders in the config file at `path` resolve against.
pub fn config_base_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_against(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Validated configuration for one batch run.
///
/// # Examples
///
/// ```rust
/// use reencode_core::{CoreConfig, EncodeMode};
/// use std::path::PathBuf;
///
/// let mut config = CoreConfig::new(
///     PathBuf::from("/videos/in"),
///     PathBuf::from("/videos/out"),
///     "2M",
/// );
/// config.min_length_secs = Some(5.0);
/// config.mode = EncodeMode::TwoPass;
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    // ---- Path Configuration ----
    /// Directory scanned (non-recursively) for media files
    pub input_dir: PathBuf,

    /// Directory receiving the `.mp4` outputs
    pub output_dir: PathBuf,

    // ---- Selection ----
    /// Files shorter than this are deleted; `None` or `<= 0` disables the filter
    pub min_length_secs: Option<f64>,

    /// Active extension allow-list
    pub formats: FormatAllowList,

    // ---- Encoder Settings ----
    /// Encoder bitrate passed to `-b:v` (e.g. `2M`, `2500k`)
    pub target_bitrate: String,

    pub video_codec: String,

    /// Audio bitrate for the final pass of two-pass mode
    pub audio_bitrate: String,

    pub mode: EncodeMode,

    /// Worker pool size; `None` launches every job at once
    pub max_jobs: Option<usize>,
}

impl CoreConfig {
    /// Creates a configuration with default formats, codec and mode.
    pub fn new(input_dir: PathBuf, output_dir: PathBuf, target_bitrate: impl Into<String>) -> Self {
        Self {
            input_dir,
            output_dir,
            min_length_secs: None,
            formats: FormatAllowList::default(),
            target_bitrate: target_bitrate.into(),
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            mode: EncodeMode::default(),
            max_jobs: None,
        }
    }

    /// Loads, converts and validates a configuration file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let config = ConfigFile::load(path)?.into_core_config(&config_base_dir(path));
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that cannot be expressed in the type.
    pub fn validate(&self) -> CoreResult<()> {
        if self.target_bitrate.is_empty() {
            return Err(CoreError::Config(
                "targetBitrate must not be empty".to_string(),
            ));
        }
        if self.video_codec.trim().is_empty() {
            return Err(CoreError::Config("videoCodec must not be empty".to_string()));
        }
        if self.max_jobs == Some(0) {
            return Err(CoreError::Config(
                "maxJobs must be at least 1".to_string(),
            ));
        }
        if let Some(min) = self.min_length_secs {
            if !min.is_finite() {
                return Err(CoreError::Config(format!(
                    "minLengthSec must be a finite number, got {}",
                    min
                )));
            }
        }
        if self.input_dir == self.output_dir {
            return Err(CoreError::Config(format!(
                "inputFolder and outputFolder must differ ({})",
                self.input_dir.display()
            )));
        }
        if self.formats.is_empty() {
            log::warn!("Every file format is ignored; no files will be processed");
        }
        Ok(())
    }

    /// Minimum duration threshold when the duration filter is active.
    pub fn duration_threshold(&self) -> Option<f64> {
        self.min_length_secs.filter(|min| *min > 0.0)
    }

    /// Worker threads for a batch of `job_count` jobs.
    pub fn worker_count(&self, job_count: usize) -> usize {
        let uncapped = job_count.max(1);
        match self.max_jobs {
            Some(cap) => cap.clamp(1, uncapped),
            None => uncapped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "inputFolder": "in",
            "outputFolder": "/abs/out",
            "targetBitrate": "2M",
            "minLengthSec": 5,
            "ignoreFileFormats": [".FLV"]
        }"#
    }

    #[test]
    fn parses_camel_case_file() {
        let file = ConfigFile::from_json_str(sample_json()).unwrap();
        assert_eq!(file.target_bitrate, BitrateValue::Text("2M".to_string()));
        assert_eq!(file.min_length_sec, Some(5.0));
        assert_eq!(file.ignore_file_formats, vec![".FLV".to_string()]);
        assert!(file.mode.is_none());
    }

    #[test]
    fn numeric_bitrate_is_accepted() {
        let json = r#"{"inputFolder": "a", "outputFolder": "b", "targetBitrate": 1500000}"#;
        let config = ConfigFile::from_json_str(json)
            .unwrap()
            .into_core_config(Path::new("/base"));
        assert_eq!(config.target_bitrate, "1500000");
    }

    #[test]
    fn relative_folders_resolve_against_base_dir() {
        let config = ConfigFile::from_json_str(sample_json())
            .unwrap()
            .into_core_config(Path::new("/etc/reencode"));
        assert_eq!(config.input_dir, PathBuf::from("/etc/reencode/in"));
        assert_eq!(config.output_dir, PathBuf::from("/abs/out"));
    }

    #[test]
    fn ignore_list_removes_formats() {
        let config = ConfigFile::from_json_str(sample_json())
            .unwrap()
            .into_core_config(Path::new("/"));
        assert!(!config.formats.contains("flv"));
        assert!(config.formats.contains("mkv"));
        assert!(config.formats.contains("mp4"));
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let json = r#"{"inputFolder": "a", "targetBitrate": "1M"}"#;
        let err = ConfigFile::from_json_str(json).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse(_)));
    }

    #[test]
    fn mode_parses_from_file_and_str() {
        let json = r#"{"inputFolder": "a", "outputFolder": "b", "targetBitrate": "1M", "mode": "two-pass"}"#;
        let file = ConfigFile::from_json_str(json).unwrap();
        assert_eq!(file.mode, Some(EncodeMode::TwoPass));
        assert_eq!("Streaming".parse::<EncodeMode>().unwrap(), EncodeMode::Streaming);
        assert!("three-pass".parse::<EncodeMode>().is_err());
    }

    #[test]
    fn base_dir_of_bare_file_name_is_cwd() {
        assert_eq!(config_base_dir(Path::new("config.json")), PathBuf::from("."));
        assert_eq!(
            config_base_dir(Path::new("/etc/reencode/config.json")),
            PathBuf::from("/etc/reencode")
        );
    }

    #[test]
    fn validate_rejects_bad_values() {
        let base = CoreConfig::new(PathBuf::from("/in"), PathBuf::from("/out"), "2M");
        assert!(base.validate().is_ok());

        let mut empty_bitrate = base.clone();
        empty_bitrate.target_bitrate.clear();
        assert!(empty_bitrate.validate().is_err());

        let mut zero_jobs = base.clone();
        zero_jobs.max_jobs = Some(0);
        assert!(zero_jobs.validate().is_err());

        let mut same_dirs = base.clone();
        same_dirs.output_dir = PathBuf::from("/in");
        assert!(same_dirs.validate().is_err());
    }

    #[test]
    fn duration_threshold_disabled_for_zero_or_absent() {
        let mut config = CoreConfig::new(PathBuf::from("/in"), PathBuf::from("/out"), "2M");
        assert_eq!(config.duration_threshold(), None);
        config.min_length_secs = Some(0.0);
        assert_eq!(config.duration_threshold(), None);
        config.min_length_secs = Some(5.0);
        assert_eq!(config.duration_threshold(), Some(5.0));
    }

    #[test]
    fn worker_count_defaults_to_one_per_job() {
        let mut config = CoreConfig::new(PathBuf::from("/in"), PathBuf::from("/out"), "2M");
        assert_eq!(config.worker_count(7), 7);
        assert_eq!(config.worker_count(0), 1);
        config.max_jobs = Some(3);
        assert_eq!(config.worker_count(7), 3);
        assert_eq!(config.worker_count(2), 2);
    }
}
