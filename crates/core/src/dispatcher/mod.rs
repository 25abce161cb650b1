//! Dispatcher module: the bounded worker pool at the heart of a run.
//!
//! The [`Dispatcher`] takes a (possibly lazy) stream of discovered files,
//! submits one [`ConversionTask`](crate::task::ConversionTask) per file to a
//! pool of at most `workers` concurrent slots, and collects outcomes as they
//! complete. Progress events are best effort: when the channel is full they are
//! dropped rather than holding up the workers.
//!
//! # Example
//!
//! ```ignore
//! use reelshift_core::dispatcher::{Dispatcher, DispatcherConfig};
//!
//! let dispatcher = Dispatcher::new(DispatcherConfig::default(), task)?;
//! let locator = FileLocator::new("/srv/media", "mkv");
//!
//! let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel(100);
//! tokio::spawn(async move {
//!     while let Some(event) = progress_rx.recv().await {
//!         println!("{:?}", event);
//!     }
//! });
//!
//! let report = dispatcher.run(locator.locate(), Some(progress_tx)).await?;
//! ```

mod config;
mod pool;
mod types;

pub use config::{DiscoveryPolicy, DispatcherConfig};
pub use pool::Dispatcher;
pub use types::{DispatchError, DispatchEvent};
