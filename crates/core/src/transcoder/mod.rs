//! Transcoder module: the boundary to the external media transcoder.
//!
//! The rest of the crate only sees the [`Transcoder`] trait. The shipped
//! implementation drives an `ffmpeg` binary as a child process; tests use
//! [`crate::testing::MockTranscoder`].
//!
//! # Example
//!
//! ```ignore
//! use reelshift_core::transcoder::{FfmpegTranscoder, Transcoder, TranscodeJob, EncodingOptions};
//!
//! let transcoder = FfmpegTranscoder::with_defaults();
//! transcoder.validate().await?;
//!
//! let job = TranscodeJob {
//!     input_path: PathBuf::from("/media/movie.mkv"),
//!     output_path: PathBuf::from("/media/movie.mp4"),
//!     options: EncodingOptions::default(),
//! };
//! let result = transcoder.transcode(&job).await?;
//! println!("Wrote {} bytes in {} ms", result.output_size_bytes, result.duration_ms);
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::TranscoderConfig;
pub use error::TranscodeError;
pub use ffmpeg::FfmpegTranscoder;
pub use traits::Transcoder;
pub use types::{AudioCodec, EncodingOptions, TranscodeJob, TranscodeResult, VideoCodec};
