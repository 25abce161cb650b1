//! Trait definitions for the archive module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ArchiveError;
use super::types::ArchivedFile;

/// Moves processed originals aside into a single archive directory.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Returns the name of this archiver implementation.
    fn name(&self) -> &str;

    /// The archive directory.
    fn archive_dir(&self) -> &Path;

    /// Creates the archive directory if needed. Safe to call repeatedly.
    async fn prepare(&self) -> Result<(), ArchiveError>;

    /// Moves `source` into the archive, keeping its file name.
    async fn archive(&self, source: &Path) -> Result<ArchivedFile, ArchiveError>;
}
