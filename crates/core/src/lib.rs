pub mod archive;
pub mod config;
pub mod dispatcher;
pub mod locator;
pub mod report;
pub mod task;
pub mod testing;
pub mod transcoder;

pub use archive::{ArchiveConfig, ArchiveError, Archiver, CollisionPolicy, FsArchiver};
pub use config::{
    load_config, load_config_from_str, load_config_or_defaults, validate_config, Config,
    ConfigError, PathsConfig,
};
pub use dispatcher::{DiscoveryPolicy, DispatchError, DispatchEvent, Dispatcher, DispatcherConfig};
pub use locator::{DiscoveryError, FileLocator, SourceFile};
pub use report::{render, Report, ReportConfig, Reporter};
pub use task::{ConversionOutcome, ConversionTask, FailureKind, TaskError};
pub use transcoder::{
    AudioCodec, EncodingOptions, FfmpegTranscoder, TranscodeError, Transcoder, TranscoderConfig,
    VideoCodec,
};
