//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::config::TranscoderConfig;
use super::error::TranscodeError;
use super::traits::Transcoder;
use super::types::{EncodingOptions, TranscodeJob, TranscodeResult};

/// Number of trailing stderr lines kept as the failure reason.
const STDERR_TAIL_LINES: usize = 20;

/// FFmpeg-based transcoder implementation.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default())
    }

    /// Builds ffmpeg arguments for a conversion.
    fn build_args(
        &self,
        input_path: &Path,
        output_path: &Path,
        options: &EncodingOptions,
    ) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-nostdin".to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
        ];

        args.extend([
            "-c:v".to_string(),
            options.video_codec.ffmpeg_codec().to_string(),
            "-c:a".to_string(),
            options.audio_codec.ffmpeg_codec().to_string(),
        ]);

        if options.audio_codec.takes_bitrate() {
            args.extend([
                "-b:a".to_string(),
                format!("{}k", options.audio_bitrate_kbps),
            ]);
        }

        if options.strict_experimental {
            args.extend(["-strict".to_string(), "experimental".to_string()]);
        }

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        args.push(output_path.to_string_lossy().to_string());

        args
    }

    fn map_spawn_error(&self, e: std::io::Error) -> TranscodeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            TranscodeError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            TranscodeError::Io(e)
        }
    }

    async fn run(&self, job: &TranscodeJob) -> Result<TranscodeResult, TranscodeError> {
        let start = Instant::now();

        if !tokio::fs::try_exists(&job.input_path).await.unwrap_or(false) {
            return Err(TranscodeError::InputNotFound {
                path: job.input_path.clone(),
            });
        }

        let args = self.build_args(&job.input_path, &job.output_path, &job.options);
        tracing::debug!(
            input = %job.input_path.display(),
            output = %job.output_path.display(),
            "Running ffmpeg {}",
            args.join(" ")
        );

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.map_spawn_error(e))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TranscodeError::failed("FFmpeg stderr was not captured", None))?;
        let mut reader = BufReader::new(stderr).lines();

        let wait = async {
            let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
            while let Some(line) = reader.next_line().await? {
                if line.trim().is_empty() {
                    continue;
                }
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, tail))
        };

        let (status, tail) = match self.config.timeout_secs {
            Some(timeout_secs) => match timeout(Duration::from_secs(timeout_secs), wait).await {
                Ok(result) => result?,
                // The child is killed when dropped.
                Err(_) => return Err(TranscodeError::Timeout { timeout_secs }),
            },
            None => wait.await?,
        };

        if !status.success() {
            let stderr = tail.into_iter().collect::<Vec<_>>().join("\n");
            return Err(TranscodeError::failed(
                format!("FFmpeg exited with code: {:?}", status.code()),
                if stderr.is_empty() { None } else { Some(stderr) },
            ));
        }

        let output_meta = tokio::fs::metadata(&job.output_path)
            .await
            .map_err(|_| TranscodeError::failed("Output file not created", None))?;

        Ok(TranscodeResult {
            output_path: job.output_path.clone(),
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn transcode(&self, job: &TranscodeJob) -> Result<TranscodeResult, TranscodeError> {
        self.run(job).await
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            return Err(TranscodeError::failed(
                "ffmpeg -version returned a failure status",
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcoder::{AudioCodec, VideoCodec};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn job_in(dir: &Path) -> TranscodeJob {
        let input_path = dir.join("movie.mkv");
        std::fs::write(&input_path, b"not really matroska").unwrap();
        TranscodeJob {
            input_path,
            output_path: dir.join("movie.mp4"),
            options: EncodingOptions::default(),
        }
    }

    #[test]
    fn test_build_args_defaults() {
        let transcoder = FfmpegTranscoder::with_defaults();
        let args = transcoder.build_args(
            Path::new("/media/movie.mkv"),
            Path::new("/media/movie.mp4"),
            &EncodingOptions::default(),
        );

        assert_eq!(args[0], "-y");
        assert!(args.windows(2).any(|w| w == ["-i", "/media/movie.mkv"]));
        assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
        assert!(args.windows(2).any(|w| w == ["-b:a", "192k"]));
        assert!(args.windows(2).any(|w| w == ["-strict", "experimental"]));
        assert_eq!(args.last().unwrap(), "/media/movie.mp4");
    }

    #[test]
    fn test_build_args_copy_audio_without_strict() {
        let config = TranscoderConfig {
            extra_ffmpeg_args: vec!["-movflags".to_string(), "+faststart".to_string()],
            ..Default::default()
        };
        let transcoder = FfmpegTranscoder::new(config);
        let options = EncodingOptions {
            video_codec: VideoCodec::H265,
            audio_codec: AudioCodec::Copy,
            audio_bitrate_kbps: 192,
            strict_experimental: false,
        };

        let args = transcoder.build_args(Path::new("/a.mkv"), Path::new("/a.mp4"), &options);

        assert!(args.windows(2).any(|w| w == ["-c:v", "libx265"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "copy"]));
        assert!(!args.contains(&"-b:a".to_string()));
        assert!(!args.contains(&"-strict".to_string()));
        // Extra args come right before the output path
        let n = args.len();
        assert_eq!(&args[n - 3..n - 1], ["-movflags", "+faststart"]);
    }

    #[tokio::test]
    async fn test_missing_binary_reports_not_found() {
        let temp = TempDir::new().unwrap();
        let transcoder = FfmpegTranscoder::new(TranscoderConfig::with_ffmpeg_path(
            PathBuf::from("/nonexistent/bin/ffmpeg"),
        ));

        let result = transcoder.transcode(&job_in(temp.path())).await;
        assert!(matches!(result, Err(TranscodeError::FfmpegNotFound { .. })));

        let result = transcoder.validate().await;
        assert!(matches!(result, Err(TranscodeError::FfmpegNotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_input_reports_input_not_found() {
        let temp = TempDir::new().unwrap();
        let transcoder = FfmpegTranscoder::with_defaults();
        let job = TranscodeJob {
            input_path: temp.path().join("absent.mkv"),
            output_path: temp.path().join("absent.mp4"),
            options: EncodingOptions::default(),
        };

        let result = transcoder.transcode(&job).await;
        assert!(matches!(result, Err(TranscodeError::InputNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let temp = TempDir::new().unwrap();
        // `false` ignores its arguments and exits with status 1.
        let transcoder =
            FfmpegTranscoder::new(TranscoderConfig::with_ffmpeg_path(PathBuf::from("false")));

        let job = job_in(temp.path());
        let result = transcoder.transcode(&job).await;
        assert!(matches!(result, Err(TranscodeError::Failed { .. })));
        assert!(job.input_path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_ffmpeg_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let script = temp.path().join("slow-ffmpeg");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let transcoder =
            FfmpegTranscoder::new(TranscoderConfig::with_ffmpeg_path(script).with_timeout(1));

        let job = job_in(temp.path());
        let start = Instant::now();
        let result = transcoder.transcode(&job).await;

        assert!(matches!(
            result,
            Err(TranscodeError::Timeout { timeout_secs: 1 })
        ));
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(job.input_path.exists());
        assert!(!job.output_path.exists());
    }
}
