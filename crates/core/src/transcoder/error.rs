//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while transcoding a file.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Transcoder process failed.
    #[error("Transcode failed: {reason}")]
    Failed {
        reason: String,
        stderr: Option<String>,
    },

    /// Transcode timed out.
    #[error("Transcode timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while running the transcoder.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    /// Creates a new failed error with optional stderr output.
    pub fn failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Human-readable reason including captured stderr, if any.
    pub fn detail(&self) -> String {
        match self {
            Self::Failed {
                stderr: Some(stderr),
                ..
            } if !stderr.trim().is_empty() => format!("{}: {}", self, stderr.trim()),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_includes_stderr() {
        let err = TranscodeError::failed(
            "FFmpeg exited with code: Some(1)",
            Some("Invalid data found when processing input\n".to_string()),
        );
        assert_eq!(
            err.detail(),
            "Transcode failed: FFmpeg exited with code: Some(1): Invalid data found when processing input"
        );
    }

    #[test]
    fn test_detail_without_stderr() {
        let err = TranscodeError::Timeout { timeout_secs: 10 };
        assert_eq!(err.detail(), "Transcode timed out after 10 seconds");
    }
}
