//! Core library for batch re-encoding of video directories with ffmpeg.
//!
//! This crate discovers media files by extension, probes them with ffprobe,
//! deletes the ones shorter than a minimum duration and transcodes the rest
//! concurrently, isolating failures per file.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use reencode_core::{CoreConfig, FfprobeProber, TerminalReporter, engine_for_config, run_batch};
//! use std::path::Path;
//!
//! let config = CoreConfig::from_file(Path::new("config.json")).unwrap();
//! let engine = engine_for_config(&config);
//! let reporter = TerminalReporter::new();
//!
//! let summary = run_batch(&config, &FfprobeProber::new(), engine.as_ref(), &reporter).unwrap();
//! if !summary.all_succeeded() {
//!     eprintln!("{} job(s) failed", summary.report.failure_count());
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod external;
pub mod filter;
pub mod formats;
pub mod media;
pub mod orchestrator;
pub mod pipeline;
pub mod reporting;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{ConfigFile, CoreConfig, EncodeMode};
pub use discovery::{discover, find_candidate_files};
pub use engine::{EncodeEngine, EncodeJob, StreamingEngine, TwoPassEngine, engine_for_config};
pub use error::{CoreError, CoreResult, EncodeError, ProbeError};
pub use external::{FfprobeProber, MediaProber, check_dependency};
pub use filter::{FilterOutcome, filter_by_min_duration};
pub use formats::FormatAllowList;
pub use media::{MediaMap, MediaMetadata};
pub use orchestrator::{BatchReport, JobOutcome, output_file_name, transcode_all};
pub use pipeline::{PipelineSummary, run_batch};
pub use reporting::{JsonReporter, NullReporter, Reporter, TerminalReporter};
pub use utils::{format_bytes, format_duration};
