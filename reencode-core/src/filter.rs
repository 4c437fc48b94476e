//! Minimum-duration filter.
//!
//! Files whose probed duration is below the threshold are deleted from the
//! input directory and dropped from the batch. A file without a known duration
//! is always kept. Deletion failures are logged and reported, never fatal.

use crate::error::CoreError;
use crate::media::MediaMap;
use crate::reporting::{DeletedFile, Reporter};

use std::path::{Path, PathBuf};

/// Result of running the duration filter over a discovered batch.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Entries that continue to the encode stage
    pub kept: MediaMap,
    /// Files removed from disk
    pub deleted: Vec<PathBuf>,
    /// Files that were too short but could not be removed
    pub failed_deletions: Vec<PathBuf>,
}

/// True when a file with `duration` must be removed for threshold `min_seconds`.
pub fn should_delete(duration: Option<f64>, min_seconds: f64) -> bool {
    matches!(duration, Some(d) if d < min_seconds)
}

/// Deletes files shorter than `min_seconds` and returns what is left.
///
/// `root_dir` is the directory the map's file names are relative to.
pub fn filter_by_min_duration(
    files: MediaMap,
    root_dir: &Path,
    min_seconds: f64,
    reporter: &dyn Reporter,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for (name, metadata) in files {
        let duration = metadata.duration();
        if !should_delete(duration, min_seconds) {
            if duration.is_none() {
                log::debug!("{}: duration unknown, keeping", name);
            }
            outcome.kept.insert(name, metadata);
            continue;
        }

        let path = root_dir.join(&name);
        let duration = duration.unwrap_or_default();
        log::info!("**DELETING** {}", path.display());
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::info!("{} was deleted", path.display());
                reporter.file_deleted(&DeletedFile {
                    path: path.display().to_string(),
                    duration_secs: duration,
                    min_length_secs: min_seconds,
                });
                outcome.deleted.push(path);
            }
            Err(source) => {
                let err = CoreError::Deletion {
                    path: path.clone(),
                    source,
                };
                log::error!("{}", err);
                reporter.warning(&err.to_string());
                outcome.failed_deletions.push(path);
            }
        }
    }

    outcome
}
