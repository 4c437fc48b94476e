//! Scratch directories for encoder side files.
//!
//! Two-pass encodes write statistics between passes. Each job gets its own
//! directory from the tempfile crate so concurrent jobs never share a stats
//! file, and the directory is removed when the returned guard is dropped.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempDir};

/// Prefix of every scratch directory created by this crate.
pub const PASS_LOG_PREFIX: &str = "reencode-pass-";

/// Creates a scratch directory for one job's pass logs. Auto-cleaned when dropped.
///
/// Uses `base` when given (created if missing), otherwise the system temp dir.
pub fn create_pass_log_dir(base: Option<&Path>) -> io::Result<TempDir> {
    let mut builder = TempFileBuilder::new();
    builder.prefix(PASS_LOG_PREFIX);
    match base {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            builder.tempdir_in(dir)
        }
        None => builder.tempdir(),
    }
}

/// File name prefix of the stats files written inside a job's scratch directory.
pub const PASS_LOG_NAME: &str = "passlog";

/// Pass log prefix inside the job scratch directory `dir`.
///
/// The name is fixed rather than derived from the source file: x265 takes the
/// stats path inside a `:`-separated parameter list, so it must not carry
/// characters from arbitrary file names.
pub fn pass_log_prefix(dir: &Path) -> PathBuf {
    dir.join(PASS_LOG_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_log_dir_is_removed_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let path = {
            let dir = create_pass_log_dir(Some(base.path())).unwrap();
            assert!(dir.path().is_dir());
            let name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with(PASS_LOG_PREFIX));
            dir.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn separate_jobs_get_separate_dirs() {
        let first = create_pass_log_dir(None).unwrap();
        let second = create_pass_log_dir(None).unwrap();
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn prefix_is_fixed_inside_the_job_dir() {
        let prefix = pass_log_prefix(Path::new("/tmp/x"));
        assert_eq!(prefix, PathBuf::from("/tmp/x/passlog"));
    }
}
