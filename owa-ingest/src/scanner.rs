//! Music directory scanner
//!
//! Walks a root directory and groups audio files by the directory that
//! contains them. Groups come back in sorted directory order with their
//! files sorted by name, so ingestion is deterministic.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Directory scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Root could not be made absolute
    #[error("Failed to resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Audio files sharing one parent directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Extension-filtered directory scanner
pub struct Scanner {
    extensions: Vec<String>,
}

impl Scanner {
    /// Create a scanner accepting the given extensions (case-insensitive,
    /// with or without a leading dot)
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Scan `root` recursively and return non-empty groups
    ///
    /// The root is canonicalized first, so every returned path is absolute.
    pub fn find_groups(&self, root: &Path) -> Result<Vec<FileGroup>, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }

        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let canonical = std::fs::canonicalize(root).map_err(|source| ScanError::Resolve {
            path: root.to_path_buf(),
            source,
        })?;
        let root = canonical.as_path();

        let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.is_audio_file(entry.path()) {
                continue;
            }

            let dir = entry
                .path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            groups.entry(dir).or_default().push(entry.into_path());
        }

        let groups: Vec<FileGroup> = groups
            .into_iter()
            .map(|(dir, mut files)| {
                files.sort();
                FileGroup { dir, files }
            })
            .collect();

        tracing::debug!(
            root = %root.display(),
            groups = groups.len(),
            files = groups.iter().map(|g| g.files.len()).sum::<usize>(),
            "Scan complete"
        );

        Ok(groups)
    }

    /// Check the extension against the allowlist
    pub fn is_audio_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
