//! Error types for the archive module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while moving an original into the archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Failed to create the archive directory.
    #[error("Failed to create archive directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive path exists but is not a directory.
    #[error("Archive path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Source file not found.
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Source path has no file name to preserve.
    #[error("Source path has no file name: {path}")]
    NoFileName { path: PathBuf },

    /// Destination already exists and the collision policy forbids replacing it.
    #[error("Archive already contains: {path}")]
    DestinationExists { path: PathBuf },

    /// Failed to copy file.
    #[error("Failed to copy file from {source} to {destination}")]
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to move/rename file.
    #[error("Failed to move file from {source} to {destination}")]
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Checksum of the copy does not match the source.
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Failed to remove the source after a verified copy.
    #[error("Failed to remove source file after copy: {path}")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Creates a copy failed error.
    pub fn copy_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::CopyFailed {
            source,
            destination,
            error,
        }
    }

    /// Creates a move failed error.
    pub fn move_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::MoveFailed {
            source,
            destination,
            error,
        }
    }

    /// Human-readable reason including the underlying I/O error, if any.
    pub fn detail(&self) -> String {
        if let Self::Io(_) = self {
            return self.to_string();
        }
        match std::error::Error::source(self) {
            Some(cause) => format!("{}: {}", self, cause),
            None => self.to_string(),
        }
    }
}
