//! Archive module for moving converted originals aside.
//!
//! The archive is a single directory that only ever receives files. It is
//! created once at startup via [`Archiver::prepare`] and then shared by every
//! conversion task.
//!
//! # Features
//!
//! - Same-filesystem rename, falling back to copy + verify + remove
//! - SHA-256 verification of copies before the source is removed
//! - Configurable name collision handling (suffix, overwrite, fail)
//! - Race-free destination naming across concurrent moves
//!
//! # Example
//!
//! ```ignore
//! use reelshift_core::archive::{Archiver, FsArchiver};
//!
//! let archiver = FsArchiver::with_defaults("/srv/media/originals");
//! archiver.prepare().await?;
//! let archived = archiver.archive(Path::new("/srv/media/movie.mkv")).await?;
//! println!("Archived to {}", archived.destination.display());
//! ```

mod config;
mod error;
mod fs_archiver;
mod traits;
mod types;

pub use config::{ArchiveConfig, CollisionPolicy};
pub use error::ArchiveError;
pub use fs_archiver::FsArchiver;
pub use traits::Archiver;
pub use types::{ArchivedFile, MoveMethod};
