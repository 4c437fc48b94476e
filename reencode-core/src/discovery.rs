//! File discovery for the batch pipeline.
//!
//! Scans the top level of the input directory for files whose extension is
//! on the active allow-list and probes each one. Subdirectories are not
//! searched. Probing is sequential and fail-fast: the first file that cannot
//! be probed aborts discovery with [`CoreError::Discovery`].

use crate::error::{CoreError, CoreResult};
use crate::external::MediaProber;
use crate::formats::FormatAllowList;
use crate::media::MediaMap;

use std::io;
use std::path::Path;

/// Lists the file names in `input_dir` whose extension is allowed, sorted.
///
/// Directories are skipped, as are names that are not valid UTF-8.
///
/// # Examples
///
/// ```rust,no_run
/// use reencode_core::{FormatAllowList, find_candidate_files};
/// use std::io;
/// use std::path::Path;
///
/// let files = find_candidate_files(Path::new("/videos/in"), &FormatAllowList::default())?;
/// for name in &files {
///     println!("{}", name);
/// }
/// # Ok::<(), reencode_core::CoreError>(())
/// ```
pub fn find_candidate_files(input_dir: &Path, formats: &FormatAllowList) -> CoreResult<Vec<String>> {
    let read_dir = std::fs::read_dir(input_dir).map_err(|e| {
        CoreError::PathError(format!(
            "Cannot read input directory {}: {}",
            input_dir.display(),
            e
        ))
    })?;

    let mut files: Vec<String> = read_dir
        .filter_map(|entry| {
            let entry = readable_entry(entry, input_dir)?;
            let path = entry.path();
            if !path.is_file() {
                return None;
            }
            if !formats.matches_path(&path) {
                log::trace!("Skipping {} (format not allowed)", path.display());
                return None;
            }
            match entry.file_name().into_string() {
                Ok(name) => Some(name),
                Err(raw) => {
                    log::warn!("Skipping file with non UTF-8 name: {:?}", raw);
                    None
                }
            }
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Unwraps a directory entry, logging and skipping ones that cannot be read.
fn readable_entry<T>(entry: io::Result<T>, input_dir: &Path) -> Option<T> {
    match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            log::warn!("Skipping unreadable entry in {}: {}", input_dir.display(), e);
            None
        }
    }
}

/// Discovers and probes every allowed file in `input_dir`.
///
/// Returns a map keyed by file name. An empty directory yields an empty map.
pub fn discover(
    input_dir: &Path,
    formats: &FormatAllowList,
    prober: &dyn MediaProber,
) -> CoreResult<MediaMap> {
    let candidates = find_candidate_files(input_dir, formats)?;
    log::info!(
        "Found {} candidate file(s) in {} ({})",
        candidates.len(),
        input_dir.display(),
        formats
    );

    let mut media = MediaMap::new();
    for name in candidates {
        let path = input_dir.join(&name);
        log::debug!("Probing {}", path.display());
        let metadata = prober.probe(&path).map_err(|source| {
            log::error!("Failed to probe {}: {}", path.display(), source);
            CoreError::Discovery {
                path: path.clone(),
                source,
            }
        })?;
        log::debug!(
            "{}: duration {}, video codec {}",
            name,
            metadata
                .duration()
                .map_or_else(|| "unknown".to_string(), |d| format!("{d:.1}s")),
            metadata
                .video_stream()
                .and_then(|v| v.codec_name.as_deref())
                .unwrap_or("none")
        );
        media.insert(name, metadata);
    }
    Ok(media)
}
