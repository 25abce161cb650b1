//! Trait definitions for the transcoder module.

use async_trait::async_trait;

use super::error::TranscodeError;
use super::types::{TranscodeJob, TranscodeResult};

/// A transcoder that turns one media file into another.
///
/// Implementations are treated as a single blocking step by the caller: the
/// future resolves once the output is fully written or the attempt failed.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Transcodes `job.input_path` into `job.output_path`, overwriting the output.
    async fn transcode(&self, job: &TranscodeJob) -> Result<TranscodeResult, TranscodeError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscodeError>;
}
