//! File system archiver implementation.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};

use super::config::{ArchiveConfig, CollisionPolicy};
use super::error::ArchiveError;
use super::traits::Archiver;
use super::types::{ArchivedFile, MoveMethod};

/// Archiver that moves originals into a directory on the local file system.
///
/// Destination names are reserved under a lock before the move starts, so two
/// concurrent moves of files sharing a base name never target the same path.
pub struct FsArchiver {
    dir: PathBuf,
    config: ArchiveConfig,
    reserved: Mutex<HashSet<PathBuf>>,
}

impl FsArchiver {
    /// Creates a new archiver for `dir` with the given configuration.
    pub fn new(dir: impl Into<PathBuf>, config: ArchiveConfig) -> Self {
        Self {
            dir: dir.into(),
            config,
            reserved: Mutex::new(HashSet::new()),
        }
    }

    /// Creates an archiver with default configuration.
    pub fn with_defaults(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, ArchiveConfig::default())
    }

    /// Candidate name for the `n`th collision: `movie.mkv` -> `movie (n).mkv`.
    fn suffixed_name(file_name: &Path, n: usize) -> OsString {
        let stem = file_name
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_default();
        let mut name = stem;
        name.push(format!(" ({})", n));
        if let Some(ext) = file_name.extension() {
            name.push(".");
            name.push(ext);
        }
        name
    }

    /// Picks the archive path for `file_name` according to the collision policy.
    fn reserve_destination(&self, file_name: &Path) -> Result<PathBuf, ArchiveError> {
        let mut reserved = self.reserved.lock().unwrap_or_else(|e| e.into_inner());
        let direct = self.dir.join(file_name);

        match self.config.collision {
            CollisionPolicy::Overwrite => Ok(direct),
            CollisionPolicy::Fail => {
                if direct.exists() || reserved.contains(&direct) {
                    return Err(ArchiveError::DestinationExists { path: direct });
                }
                reserved.insert(direct.clone());
                Ok(direct)
            }
            CollisionPolicy::Suffix => {
                let mut candidate = direct;
                let mut n = 0;
                while candidate.exists() || reserved.contains(&candidate) {
                    n += 1;
                    candidate = self.dir.join(Self::suffixed_name(file_name, n));
                }
                reserved.insert(candidate.clone());
                Ok(candidate)
            }
        }
    }

    fn release(&self, destination: &Path) {
        let mut reserved = self.reserved.lock().unwrap_or_else(|e| e.into_inner());
        reserved.remove(destination);
    }

    /// Attempts to move a file atomically (rename).
    async fn try_atomic_move(source: &Path, destination: &Path) -> Result<bool, ArchiveError> {
        match fs::rename(source, destination).await {
            Ok(()) => Ok(true),
            Err(e) => {
                // Cross-filesystem moves fail with EXDEV (18 on Linux)
                if e.kind() == std::io::ErrorKind::CrossesDevices || e.raw_os_error() == Some(18) {
                    Ok(false)
                } else {
                    Err(ArchiveError::move_failed(
                        source.to_path_buf(),
                        destination.to_path_buf(),
                        e,
                    ))
                }
            }
        }
    }

    /// Copies a file, returning its size and SHA-256 of the bytes written.
    ///
    /// A partially written destination is removed when the copy fails.
    async fn copy_file(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<(u64, String), ArchiveError> {
        let copy_failed =
            |e| ArchiveError::copy_failed(source.to_path_buf(), destination.to_path_buf(), e);

        let source_file = File::open(source).await.map_err(copy_failed)?;
        let dest_file = File::create(destination).await.map_err(copy_failed)?;

        match self.write_copy(source_file, dest_file).await {
            Ok(copied) => Ok(copied),
            Err(e) => {
                Self::discard(destination).await;
                Err(copy_failed(e))
            }
        }
    }

    async fn write_copy(&self, source: File, destination: File) -> std::io::Result<(u64, String)> {
        let mut reader = BufReader::with_capacity(self.config.buffer_size, source);
        let mut writer = BufWriter::with_capacity(self.config.buffer_size, destination);
        let mut hasher = Sha256::new();
        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; self.config.buffer_size];

        loop {
            let bytes_read = reader.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
            writer.write_all(&buffer[..bytes_read]).await?;
            total_bytes += bytes_read as u64;
        }

        writer.flush().await?;
        writer.get_mut().sync_all().await?;

        Ok((total_bytes, format!("{:x}", hasher.finalize())))
    }

    /// Best-effort removal of a copy that will not be kept.
    async fn discard(path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), "Failed to remove incomplete copy: {}", e);
            }
        }
    }

    /// Calculates the SHA-256 of a file.
    async fn checksum(&self, path: &Path) -> Result<String, ArchiveError> {
        let file = File::open(path).await?;
        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut buffer = vec![0u8; self.config.buffer_size];
        let mut hasher = Sha256::new();
        loop {
            let bytes_read = reader.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Copies `source` to `destination`, verifies the copy, then removes `source`.
    async fn copy_then_remove(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<u64, ArchiveError> {
        let (size_bytes, expected) = self.copy_file(source, destination).await?;

        if self.config.verify_copies {
            let actual = match self.checksum(destination).await {
                Ok(actual) => actual,
                Err(e) => {
                    Self::discard(destination).await;
                    return Err(e);
                }
            };
            if actual != expected {
                Self::discard(destination).await;
                return Err(ArchiveError::ChecksumMismatch {
                    path: destination.to_path_buf(),
                    expected,
                    actual,
                });
            }
        }

        fs::remove_file(source)
            .await
            .map_err(|e| ArchiveError::CleanupFailed {
                path: source.to_path_buf(),
                source: e,
            })?;

        Ok(size_bytes)
    }

    async fn move_to(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<ArchivedFile, ArchiveError> {
        let (size_bytes, method) = if Self::try_atomic_move(source, destination).await? {
            let meta = fs::metadata(destination).await?;
            (meta.len(), MoveMethod::Rename)
        } else {
            tracing::debug!(
                source = %source.display(),
                destination = %destination.display(),
                "Rename crossed filesystems, falling back to copy"
            );
            let size = self.copy_then_remove(source, destination).await?;
            (size, MoveMethod::Copy)
        };

        Ok(ArchivedFile {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            size_bytes,
            method,
        })
    }
}

#[async_trait]
impl Archiver for FsArchiver {
    fn name(&self) -> &str {
        "fs"
    }

    fn archive_dir(&self) -> &Path {
        &self.dir
    }

    async fn prepare(&self) -> Result<(), ArchiveError> {
        if let Ok(meta) = fs::metadata(&self.dir).await {
            if !meta.is_dir() {
                return Err(ArchiveError::NotADirectory {
                    path: self.dir.clone(),
                });
            }
            return Ok(());
        }

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ArchiveError::DirectoryCreationFailed {
                path: self.dir.clone(),
                source: e,
            })?;

        tracing::info!(path = %self.dir.display(), "Created archive directory");
        Ok(())
    }

    async fn archive(&self, source: &Path) -> Result<ArchivedFile, ArchiveError> {
        if !fs::try_exists(source).await.unwrap_or(false) {
            return Err(ArchiveError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        let file_name = source.file_name().ok_or_else(|| ArchiveError::NoFileName {
            path: source.to_path_buf(),
        })?;

        let destination = self.reserve_destination(Path::new(file_name))?;
        let result = self.move_to(source, &destination).await;
        self.release(&destination);

        let archived = result?;
        tracing::debug!(
            source = %archived.source.display(),
            destination = %archived.destination.display(),
            method = ?archived.method,
            "Archived original"
        );
        Ok(archived)
    }
}
