//! Types for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Video codec used for the converted stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
    /// Copy (no re-encoding)
    Copy,
}

impl VideoCodec {
    /// Returns the ffmpeg encoder name for this codec.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::H265 => "libx265",
            Self::Copy => "copy",
        }
    }
}

/// Audio codec used for the converted stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCodec {
    /// Advanced Audio Coding
    Aac,
    /// MPEG Audio Layer III
    Mp3,
    /// Opus
    Opus,
    /// Copy (no re-encoding)
    Copy,
}

impl AudioCodec {
    /// Returns the ffmpeg encoder name for this codec.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Mp3 => "libmp3lame",
            Self::Opus => "libopus",
            Self::Copy => "copy",
        }
    }

    /// Whether a bitrate applies to this codec.
    pub fn takes_bitrate(&self) -> bool {
        !matches!(self, Self::Copy)
    }
}

/// Encoding parameters shared by every conversion of a run.
///
/// Built once from configuration at startup and copied into each job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingOptions {
    /// Target video codec.
    #[serde(default = "default_video_codec")]
    pub video_codec: VideoCodec,
    /// Target audio codec.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: AudioCodec,
    /// Target audio bitrate in kbps.
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate_kbps: u32,
    /// Passes `-strict experimental` so older ffmpeg builds accept the AAC encoder.
    #[serde(default = "default_strict")]
    pub strict_experimental: bool,
}

fn default_video_codec() -> VideoCodec {
    VideoCodec::H264
}

fn default_audio_codec() -> AudioCodec {
    AudioCodec::Aac
}

fn default_audio_bitrate() -> u32 {
    192
}

fn default_strict() -> bool {
    true
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            audio_bitrate_kbps: default_audio_bitrate(),
            strict_experimental: default_strict(),
        }
    }
}

/// A single transcode request.
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    /// Path of the file to read.
    pub input_path: PathBuf,
    /// Path of the file to write. Overwritten if it exists.
    pub output_path: PathBuf,
    /// Encoding parameters.
    pub options: EncodingOptions,
}

/// Result of a successful transcode.
#[derive(Debug, Clone)]
pub struct TranscodeResult {
    /// Path of the written file.
    pub output_path: PathBuf,
    /// Size of the written file in bytes.
    pub output_size_bytes: u64,
    /// Wall-clock time spent transcoding.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_defaults() {
        let options = EncodingOptions::default();
        assert_eq!(options.video_codec, VideoCodec::H264);
        assert_eq!(options.audio_codec, AudioCodec::Aac);
        assert_eq!(options.audio_bitrate_kbps, 192);
        assert!(options.strict_experimental);
    }

    #[test]
    fn test_codec_names() {
        assert_eq!(VideoCodec::H264.ffmpeg_codec(), "libx264");
        assert_eq!(VideoCodec::H265.ffmpeg_codec(), "libx265");
        assert_eq!(AudioCodec::Aac.ffmpeg_codec(), "aac");
        assert!(!AudioCodec::Copy.takes_bitrate());
    }

    #[test]
    fn test_encoding_options_partial_deserialize() {
        let options: EncodingOptions = toml::from_str(
            r#"
video_codec = "h265"
audio_bitrate_kbps = 256
"#,
        )
        .unwrap();
        assert_eq!(options.video_codec, VideoCodec::H265);
        assert_eq!(options.audio_codec, AudioCodec::Aac);
        assert_eq!(options.audio_bitrate_kbps, 256);
        assert!(options.strict_experimental);
    }
}
