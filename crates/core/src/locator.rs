//! Recursive discovery of source files.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// A traversal error for one entry under the root.
#[derive(Debug, Error)]
#[error("Failed to read {path}: {source}")]
pub struct DiscoveryError {
    /// Path that could not be read, or the walk root when walkdir gives none.
    pub path: PathBuf,
    #[source]
    pub source: walkdir::Error,
}

/// An absolute path to a discovered input file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceFile(PathBuf);

impl SourceFile {
    /// Wraps a path. Relative paths are resolved against the current directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_absolute() {
            Self(path)
        } else {
            Self(std::path::absolute(&path).unwrap_or(path))
        }
    }

    /// The file path.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Consumes the wrapper.
    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for SourceFile {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Walks a directory tree yielding files with a given extension.
#[derive(Debug, Clone)]
pub struct FileLocator {
    root: PathBuf,
    extension: String,
    excluded: Vec<PathBuf>,
}

impl FileLocator {
    /// Creates a locator for `root` matching `extension` (with or without the leading dot).
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        let root = SourceFile::new(root).into_path();
        Self {
            root,
            extension: normalize_extension(extension),
            excluded: Vec::new(),
        }
    }

    /// Prunes `dir` (and everything under it) from the walk.
    pub fn excluding(mut self, dir: impl Into<PathBuf>) -> Self {
        self.excluded.push(SourceFile::new(dir).into_path());
        self
    }

    /// The root being walked.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Checks that the root is a readable directory.
    ///
    /// [`locate`](Self::locate) reports an unreadable root as an ordinary
    /// discovery error.
    pub fn check_root(&self) -> std::io::Result<()> {
        let mut entries = std::fs::read_dir(&self.root)?;
        if let Some(Err(e)) = entries.next() {
            return Err(e);
        }
        Ok(())
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }

    /// Lazily walks the tree.
    ///
    /// Entries are visited in file-name order within each directory. Symbolic
    /// links are not followed. Unreadable entries are yielded as errors and the
    /// walk continues past them.
    pub fn locate(&self) -> impl Iterator<Item = Result<SourceFile, DiscoveryError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| {
                !(e.file_type().is_dir() && self.excluded.iter().any(|x| e.path() == x))
            })
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.matches(entry.path()) {
                        Some(Ok(SourceFile::new(entry.into_path())))
                    } else {
                        None
                    }
                }
                Err(err) => Some(Err(DiscoveryError {
                    path: err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone()),
                    source: err,
                })),
            })
    }
}

/// Lowercases and strips a leading dot: `".MKV"` -> `"mkv"`.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}
