//! The per-file unit of work: transcode, then archive the original.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::archive::{ArchiveError, Archiver};
use crate::locator::{normalize_extension, SourceFile};
use crate::transcoder::{EncodingOptions, TranscodeError, TranscodeJob, Transcoder};

/// Why a single file failed.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The transcoder reported failure. The original was not touched.
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// Conversion succeeded but moving the original into the archive failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The task panicked.
    #[error("Task panicked: {0}")]
    Panicked(String),
}

/// Coarse classification of a [`TaskError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Transcode,
    Archive,
    Panic,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transcode => "transcode",
            Self::Archive => "archive",
            Self::Panic => "panic",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TaskError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transcode(_) => FailureKind::Transcode,
            Self::Archive(_) => FailureKind::Archive,
            Self::Panicked(_) => FailureKind::Panic,
        }
    }

    /// Human-readable reason, including captured transcoder output.
    pub fn reason(&self) -> String {
        match self {
            Self::Transcode(e) => e.detail(),
            Self::Archive(e) => e.detail(),
            Self::Panicked(_) => self.to_string(),
        }
    }
}

/// Terminal result of one conversion attempt.
#[derive(Debug)]
pub enum ConversionOutcome {
    Success {
        source: SourceFile,
        /// The converted file.
        output: PathBuf,
        /// Where the original now lives.
        archived_to: PathBuf,
    },
    Failure {
        source: SourceFile,
        error: TaskError,
    },
}

impl ConversionOutcome {
    pub fn source(&self) -> &SourceFile {
        match self {
            Self::Success { source, .. } | Self::Failure { source, .. } => source,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Destination of a conversion: same directory and stem, new extension.
pub fn destination_path(source: &Path, target_extension: &str) -> PathBuf {
    source.with_extension(normalize_extension(target_extension))
}

/// Converts one file and, on success, archives the original.
///
/// Cheap to clone; every clone shares the same transcoder and archiver.
pub struct ConversionTask<T: Transcoder, A: Archiver> {
    transcoder: Arc<T>,
    archiver: Arc<A>,
    options: EncodingOptions,
    target_extension: String,
}

impl<T: Transcoder, A: Archiver> Clone for ConversionTask<T, A> {
    fn clone(&self) -> Self {
        Self {
            transcoder: Arc::clone(&self.transcoder),
            archiver: Arc::clone(&self.archiver),
            options: self.options,
            target_extension: self.target_extension.clone(),
        }
    }
}

impl<T: Transcoder, A: Archiver> ConversionTask<T, A> {
    pub fn new(
        transcoder: Arc<T>,
        archiver: Arc<A>,
        options: EncodingOptions,
        target_extension: &str,
    ) -> Self {
        Self {
            transcoder,
            archiver,
            options,
            target_extension: normalize_extension(target_extension),
        }
    }

    /// Runs the task. Never panics on I/O or transcoder errors; they become
    /// [`ConversionOutcome::Failure`].
    pub async fn execute(&self, source: SourceFile) -> ConversionOutcome {
        match self.run(&source).await {
            Ok((output, archived_to)) => {
                tracing::info!(
                    source = %source,
                    output = %output.display(),
                    archived_to = %archived_to.display(),
                    "Converted"
                );
                ConversionOutcome::Success {
                    source,
                    output,
                    archived_to,
                }
            }
            Err(error) => {
                tracing::warn!(
                    source = %source,
                    kind = %error.kind(),
                    "Conversion failed: {}",
                    error.reason()
                );
                ConversionOutcome::Failure { source, error }
            }
        }
    }

    async fn run(&self, source: &SourceFile) -> Result<(PathBuf, PathBuf), TaskError> {
        let job = TranscodeJob {
            input_path: source.path().to_path_buf(),
            output_path: destination_path(source.path(), &self.target_extension),
            options: self.options,
        };

        let result = self.transcoder.transcode(&job).await?;
        tracing::debug!(
            source = %source,
            bytes = result.output_size_bytes,
            duration_ms = result.duration_ms,
            "Transcode finished"
        );

        let archived = self.archiver.archive(source.path()).await?;

        Ok((result.output_path, archived.destination))
    }
}
