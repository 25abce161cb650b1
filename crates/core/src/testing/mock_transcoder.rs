//! Mock transcoder for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::transcoder::{TranscodeError, TranscodeJob, TranscodeResult, Transcoder};

/// A recorded transcode for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTranscode {
    /// The job that was submitted.
    pub job: TranscodeJob,
    /// Whether the transcode succeeded.
    pub success: bool,
}

/// Mock implementation of the Transcoder trait.
///
/// Provides controllable behavior for testing:
/// - Track transcode jobs for assertions
/// - Fail (or panic) for chosen input file names
/// - Simulate transcode duration
/// - Measure peak concurrency
///
/// Successful transcodes write a small text file at the output path.
#[derive(Debug, Clone, Default)]
pub struct MockTranscoder {
    /// Recorded transcodes.
    transcodes: Arc<RwLock<Vec<RecordedTranscode>>>,
    /// Input file name -> stderr text of the simulated failure.
    failures: Arc<RwLock<HashMap<String, String>>>,
    /// Input file names whose transcode panics.
    panics: Arc<RwLock<HashSet<String>>>,
    /// Simulated transcode duration in milliseconds.
    duration_ms: Arc<RwLock<u64>>,
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

/// Decrements the running counter even when the transcode panics.
struct RunningGuard(Arc<AtomicUsize>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded transcodes.
    pub async fn recorded_transcodes(&self) -> Vec<RecordedTranscode> {
        self.transcodes.read().await.clone()
    }

    /// Get the number of transcodes attempted.
    pub async fn transcode_count(&self) -> usize {
        self.transcodes.read().await.len()
    }

    /// Make every transcode of a file named `file_name` fail with `stderr`.
    pub async fn fail_file(&self, file_name: &str, stderr: &str) {
        self.failures
            .write()
            .await
            .insert(file_name.to_string(), stderr.to_string());
    }

    /// Make every transcode of a file named `file_name` panic.
    pub async fn panic_on(&self, file_name: &str) {
        self.panics.write().await.insert(file_name.to_string());
    }

    /// Set the simulated transcode duration.
    pub async fn set_transcode_duration(&self, duration: Duration) {
        *self.duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Highest number of transcodes observed running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(&self, job: &TranscodeJob) -> Result<TranscodeResult, TranscodeError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _guard = RunningGuard(Arc::clone(&self.running));

        let duration_ms = *self.duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        let name = Self::file_name(&job.input_path);

        if self.panics.read().await.contains(&name) {
            panic!("mock transcoder panic for {}", name);
        }

        let failure = self.failures.read().await.get(&name).cloned();
        if let Some(stderr) = failure {
            self.transcodes.write().await.push(RecordedTranscode {
                job: job.clone(),
                success: false,
            });
            return Err(TranscodeError::failed(
                "FFmpeg exited with code: Some(1)",
                Some(stderr),
            ));
        }

        if !tokio::fs::try_exists(&job.input_path).await.unwrap_or(false) {
            self.transcodes.write().await.push(RecordedTranscode {
                job: job.clone(),
                success: false,
            });
            return Err(TranscodeError::InputNotFound {
                path: job.input_path.clone(),
            });
        }

        let content = format!("converted from {}", name);
        tokio::fs::write(&job.output_path, &content).await?;

        self.transcodes.write().await.push(RecordedTranscode {
            job: job.clone(),
            success: true,
        });

        Ok(TranscodeResult {
            output_path: job.output_path.clone(),
            output_size_bytes: content.len() as u64,
            duration_ms,
        })
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcoder::EncodingOptions;
    use tempfile::TempDir;

    fn create_test_job(dir: &Path, name: &str) -> TranscodeJob {
        let input_path = dir.join(name);
        std::fs::write(&input_path, "source").unwrap();
        TranscodeJob {
            output_path: input_path.with_extension("mp4"),
            input_path,
            options: EncodingOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_basic_transcode_writes_output() {
        let temp = TempDir::new().unwrap();
        let transcoder = MockTranscoder::new();

        let job = create_test_job(temp.path(), "movie.mkv");
        let result = transcoder.transcode(&job).await.unwrap();

        assert_eq!(result.output_path, temp.path().join("movie.mp4"));
        let content = std::fs::read_to_string(&result.output_path).unwrap();
        assert_eq!(content, "converted from movie.mkv");
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let temp = TempDir::new().unwrap();
        let transcoder = MockTranscoder::new();
        transcoder.fail_file("bad.mkv", "corrupt header").await;

        let err = transcoder
            .transcode(&create_test_job(temp.path(), "bad.mkv"))
            .await
            .unwrap_err();
        assert!(err.detail().contains("corrupt header"));
        assert!(!temp.path().join("bad.mp4").exists());

        let recorded = transcoder.recorded_transcodes().await;
        assert_eq!(recorded.len(), 1);
        assert!(!recorded[0].success);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let temp = TempDir::new().unwrap();
        let transcoder = MockTranscoder::new();
        let clone = transcoder.clone();

        clone
            .transcode(&create_test_job(temp.path(), "a.mkv"))
            .await
            .unwrap();
        assert_eq!(transcoder.transcode_count().await, 1);
        assert_eq!(transcoder.peak_concurrency(), 1);
    }
}
