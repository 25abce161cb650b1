use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::archive::ArchiveConfig;
use crate::dispatcher::DispatcherConfig;
use crate::report::ReportConfig;
use crate::transcoder::{EncodingOptions, TranscoderConfig};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub encoding: EncodingOptions,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where to look for sources and where originals go.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Directory scanned recursively for source files.
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,
    /// Originals are moved here after a successful conversion.
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    #[serde(default = "default_target_extension")]
    pub target_extension: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            archive_dir: default_archive_dir(),
            source_extension: default_source_extension(),
            target_extension: default_target_extension(),
        }
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from("/srv/media/convert")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("/srv/media/convert/originals")
}

fn default_source_extension() -> String {
    "mkv".to_string()
}

fn default_target_extension() -> String {
    "mp4".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::CollisionPolicy;
    use crate::dispatcher::DiscoveryPolicy;
    use crate::transcoder::{AudioCodec, VideoCodec};

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.paths.source_root, PathBuf::from("/srv/media/convert"));
        assert_eq!(config.paths.source_extension, "mkv");
        assert_eq!(config.paths.target_extension, "mp4");
        assert_eq!(config.dispatcher.workers, 4);
        assert_eq!(config.encoding.video_codec, VideoCodec::H264);
        assert_eq!(config.encoding.audio_codec, AudioCodec::Aac);
        assert_eq!(config.encoding.audio_bitrate_kbps, 192);
        assert!(config.encoding.strict_experimental);
        assert!(config.report.sort_paths);
    }

    #[test]
    fn test_full_document() {
        let toml = r#"
[paths]
source_root = "/data/in"
archive_dir = "/data/done"
source_extension = ".MKV"

[dispatcher]
workers = 2
on_discovery_error = "abort"

[encoding]
video_codec = "h265"
audio_codec = "opus"
audio_bitrate_kbps = 128
strict_experimental = false

[transcoder]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
timeout_secs = 3600
extra_ffmpeg_args = ["-preset", "fast"]

[archive]
collision = "overwrite"

[report]
sort_paths = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.paths.archive_dir, PathBuf::from("/data/done"));
        assert_eq!(config.paths.target_extension, "mp4");
        assert_eq!(config.dispatcher.workers, 2);
        assert_eq!(config.dispatcher.on_discovery_error, DiscoveryPolicy::Abort);
        assert_eq!(config.encoding.video_codec, VideoCodec::H265);
        assert_eq!(config.encoding.audio_codec, AudioCodec::Opus);
        assert!(!config.encoding.strict_experimental);
        assert_eq!(config.transcoder.timeout_secs, Some(3600));
        assert_eq!(config.transcoder.extra_ffmpeg_args, vec!["-preset", "fast"]);
        assert_eq!(config.archive.collision, CollisionPolicy::Overwrite);
        assert!(!config.report.sort_paths);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
