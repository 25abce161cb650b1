//! Testing utilities and mock implementations.
//!
//! The mock transcoder lets the dispatcher and task logic run against real
//! temporary directories without an ffmpeg binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use reelshift_core::testing::MockTranscoder;
//!
//! let transcoder = MockTranscoder::new();
//! transcoder.fail_file("movie2.mkv", "Invalid data found when processing input").await;
//!
//! // Use in a Dispatcher...
//! assert_eq!(transcoder.transcode_count().await, 3);
//! ```

mod mock_transcoder;

pub use mock_transcoder::{MockTranscoder, RecordedTranscode};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// Writes `content` to `root/relative`, creating parent directories.
    pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
        }
        std::fs::write(&path, content).expect("Failed to write fixture file");
        path
    }

    /// Lists file names directly inside `dir`, sorted.
    pub fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .expect("Failed to read fixture directory")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}
