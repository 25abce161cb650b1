//! Configuration for the archive module.

use serde::{Deserialize, Serialize};

/// What to do when the archive already holds a file with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Keep both: archive as `name (1).ext`, `name (2).ext`, ...
    #[default]
    Suffix,
    /// Replace the existing archived file.
    Overwrite,
    /// Fail the move; the original stays where it is.
    Fail,
}

/// Configuration for the file system archiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Name collision handling.
    #[serde(default)]
    pub collision: CollisionPolicy,

    /// Buffer size for cross-filesystem copies in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Whether to verify a cross-filesystem copy by checksum before removing the source.
    #[serde(default = "default_true")]
    pub verify_copies: bool,
}

fn default_buffer_size() -> usize {
    8 * 1024 * 1024 // 8 MB
}

fn default_true() -> bool {
    true
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            collision: CollisionPolicy::default(),
            buffer_size: default_buffer_size(),
            verify_copies: true,
        }
    }
}

impl ArchiveConfig {
    /// Sets the collision policy.
    pub fn with_collision(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    /// Sets the buffer size for copies.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }
}
