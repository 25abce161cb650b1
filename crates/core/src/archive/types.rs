//! Types for the archive module.

use std::path::PathBuf;

/// How a file reached the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMethod {
    /// Same-filesystem rename.
    Rename,
    /// Copy to the archive, then removal of the source.
    Copy,
}

/// A file that was moved into the archive.
#[derive(Debug, Clone)]
pub struct ArchivedFile {
    /// Where the file was before the move.
    pub source: PathBuf,
    /// Where the file is now.
    pub destination: PathBuf,
    /// Size in bytes.
    pub size_bytes: u64,
    /// How the move was performed.
    pub method: MoveMethod,
}
