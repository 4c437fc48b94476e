//! Active file-extension allow-list.
//!
//! Extensions are stored lower-cased without a leading dot, so `".MKV"`,
//! `"mkv"` and `"Mkv"` all name the same entry.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Extensions eligible for processing before any are ignored.
pub const DEFAULT_FILE_FORMATS: &[&str] = &["mp4", "flv", "mkv"];

/// Set of normalized extensions eligible for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatAllowList {
    extensions: BTreeSet<String>,
}

impl Default for FormatAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_FORMATS.iter().copied())
    }
}

impl FormatAllowList {
    /// Builds an allow-list from arbitrary extension spellings.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    /// Returns a copy without the given extensions. Absent entries are ignored.
    #[must_use]
    pub fn without<I, S>(mut self, ignored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in ignored {
            let normalized = normalize_extension(ext.as_ref());
            if self.extensions.remove(&normalized) {
                log::debug!("Ignoring file format: .{}", normalized);
            }
        }
        self
    }

    /// Case-insensitive membership test for a bare extension.
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(&normalize_extension(extension))
    }

    /// True when the path's extension is in the allow-list.
    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.contains(ext))
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

impl fmt::Display for FormatAllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.extensions.iter().map(|e| format!(".{e}")).collect();
        f.write_str(&joined.join(", "))
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_list_contains_base_formats() {
        let list = FormatAllowList::default();
        assert_eq!(list.len(), 3);
        assert!(list.contains("mp4"));
        assert!(list.contains(".FLV"));
        assert!(list.contains("Mkv"));
        assert!(!list.contains("txt"));
    }

    #[test]
    fn ignore_is_case_insensitive() {
        let list = FormatAllowList::default().without([".MKV", "Flv"]);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["mp4"]);
    }

    #[test]
    fn ignore_is_idempotent() {
        let once = FormatAllowList::default().without(["mkv"]);
        let twice = once.clone().without(["mkv", ".avi"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn duplicates_collapse() {
        let list = FormatAllowList::new(["mp4", ".MP4", "mp4"]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn matches_path_extension() {
        let list = FormatAllowList::default();
        assert!(list.matches_path(Path::new("/videos/clip.MP4")));
        assert!(!list.matches_path(Path::new("/videos/notes.txt")));
        assert!(!list.matches_path(Path::new("/videos/README")));
    }

    #[test]
    fn display_lists_dotted_extensions() {
        let list = FormatAllowList::new(["mkv", "flv"]);
        assert_eq!(list.to_string(), ".flv, .mkv");
    }
}
