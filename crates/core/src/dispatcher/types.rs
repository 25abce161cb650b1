//! Types for the dispatcher.

use crate::locator::{DiscoveryError, SourceFile};
use crate::report::Report;
use crate::task::{ConversionOutcome, FailureKind};

/// Progress notifications emitted while a run is in flight.
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// A file was found and queued for a worker slot.
    Queued { source: SourceFile },
    /// A worker slot picked the file up.
    Started { source: SourceFile },
    /// The file's task finished.
    Finished {
        source: SourceFile,
        success: bool,
        /// Set when `success` is false.
        failure: Option<(FailureKind, String)>,
    },
    /// The walk skipped an unreadable path.
    DiscoverySkipped { message: String },
}

impl DispatchEvent {
    pub(crate) fn finished(outcome: &ConversionOutcome) -> Self {
        match outcome {
            ConversionOutcome::Success { source, .. } => Self::Finished {
                source: source.clone(),
                success: true,
                failure: None,
            },
            ConversionOutcome::Failure { source, error } => Self::Finished {
                source: source.clone(),
                success: false,
                failure: Some((error.kind(), error.reason())),
            },
        }
    }
}

/// Errors that stop a run as a whole.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The pool needs at least one worker.
    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,

    /// The walk failed and the policy is to abort. In-flight work was drained
    /// into `partial`.
    #[error("Discovery aborted: {error}")]
    DiscoveryAborted {
        #[source]
        error: DiscoveryError,
        partial: Box<Report>,
    },
}
