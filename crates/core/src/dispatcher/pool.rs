//! Bounded worker pool that runs one conversion task per discovered file.

use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::archive::Archiver;
use crate::locator::{DiscoveryError, SourceFile};
use crate::report::Report;
use crate::task::{ConversionOutcome, ConversionTask, TaskError};
use crate::transcoder::Transcoder;

use super::config::{DiscoveryPolicy, DispatcherConfig};
use super::types::{DispatchError, DispatchEvent};

/// Runs conversion tasks on at most `workers` files at a time and folds their
/// outcomes, in completion order, into a [`Report`].
///
/// Every submitted file yields exactly one outcome. A failing or panicking task
/// never affects its siblings, and nothing is retried.
pub struct Dispatcher<T: Transcoder, A: Archiver> {
    config: DispatcherConfig,
    task: ConversionTask<T, A>,
    semaphore: Arc<Semaphore>,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl<T: Transcoder + 'static, A: Archiver + 'static> Dispatcher<T, A> {
    /// Creates a dispatcher. Fails if `config.workers` is zero.
    pub fn new(config: DispatcherConfig, task: ConversionTask<T, A>) -> Result<Self, DispatchError> {
        if config.workers == 0 {
            return Err(DispatchError::InvalidWorkerCount);
        }
        let semaphore = Arc::new(Semaphore::new(config.workers));
        Ok(Self {
            config,
            task,
            semaphore,
        })
    }

    /// Maximum number of tasks running at once.
    pub fn workers(&self) -> usize {
        self.config.workers
    }

    /// Runs every file of an already-known list.
    pub async fn run_files(
        &self,
        files: impl IntoIterator<Item = SourceFile>,
        progress_tx: Option<mpsc::Sender<DispatchEvent>>,
    ) -> Result<Report, DispatchError> {
        self.run(files.into_iter().map(Ok), progress_tx).await
    }

    /// Submits one task per discovered file and waits for all of them.
    ///
    /// `sources` is consumed lazily: tasks start while the walk is still going.
    pub async fn run<I>(
        &self,
        sources: I,
        progress_tx: Option<mpsc::Sender<DispatchEvent>>,
    ) -> Result<Report, DispatchError>
    where
        I: IntoIterator<Item = Result<SourceFile, DiscoveryError>>,
    {
        let mut report = Report::new(Utc::now());
        let mut in_flight: JoinSet<ConversionOutcome> = JoinSet::new();
        let mut pending: HashSet<SourceFile> = HashSet::new();
        let mut aborted: Option<DiscoveryError> = None;

        for item in sources {
            let source = match item {
                Ok(source) => source,
                Err(error) => match self.config.on_discovery_error {
                    DiscoveryPolicy::Skip => {
                        tracing::warn!(path = %error.path.display(), "Skipping unreadable path: {}", error);
                        report.record_discovery_error(&error);
                        Self::emit(
                            &progress_tx,
                            DispatchEvent::DiscoverySkipped {
                                message: error.to_string(),
                            },
                        );
                        continue;
                    }
                    DiscoveryPolicy::Abort => {
                        tracing::error!(path = %error.path.display(), "Discovery failed, aborting: {}", error);
                        aborted = Some(error);
                        break;
                    }
                },
            };

            if !pending.insert(source.clone()) {
                tracing::debug!(source = %source, "Ignoring duplicate submission");
                continue;
            }

            Self::emit(
                &progress_tx,
                DispatchEvent::Queued {
                    source: source.clone(),
                },
            );
            self.submit(&mut in_flight, source, progress_tx.clone());
        }

        tracing::info!(
            submitted = pending.len(),
            workers = self.config.workers,
            "All files submitted, waiting for workers"
        );

        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok(outcome) => {
                    pending.remove(outcome.source());
                    Self::emit(&progress_tx, DispatchEvent::finished(&outcome));
                    report.record(outcome);
                }
                Err(e) => {
                    // Tasks catch their own panics, so this only happens if the
                    // runtime is shutting down. Leftovers are reported below.
                    tracing::error!("Worker task ended abnormally: {}", e);
                }
            }
        }

        for source in pending.drain() {
            let outcome = ConversionOutcome::Failure {
                source,
                error: TaskError::Panicked("worker ended without an outcome".to_string()),
            };
            Self::emit(&progress_tx, DispatchEvent::finished(&outcome));
            report.record(outcome);
        }

        let report = report.finish();
        tracing::info!(
            succeeded = report.successes.len(),
            failed = report.failures.len(),
            skipped = report.discovery_errors.len(),
            "Run complete"
        );

        match aborted {
            Some(error) => Err(DispatchError::DiscoveryAborted {
                error,
                partial: Box::new(report),
            }),
            None => Ok(report),
        }
    }

    fn submit(
        &self,
        in_flight: &mut JoinSet<ConversionOutcome>,
        source: SourceFile,
        progress_tx: Option<mpsc::Sender<DispatchEvent>>,
    ) {
        let semaphore = Arc::clone(&self.semaphore);
        let task = self.task.clone();

        in_flight.spawn(async move {
            // The semaphore is never closed.
            let _permit = semaphore.acquire_owned().await.ok();

            Self::emit(
                &progress_tx,
                DispatchEvent::Started {
                    source: source.clone(),
                },
            );

            let fallback = source.clone();
            match AssertUnwindSafe(task.execute(source)).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload);
                    tracing::error!(source = %fallback, "Conversion task panicked: {}", message);
                    ConversionOutcome::Failure {
                        source: fallback,
                        error: TaskError::Panicked(message),
                    }
                }
            }
        });
    }

    /// Progress is best effort: a full or closed channel drops the event
    /// instead of stalling the run.
    fn emit(progress_tx: &Option<mpsc::Sender<DispatchEvent>>, event: DispatchEvent) {
        if let Some(tx) = progress_tx {
            if let Err(mpsc::error::TrySendError::Full(event)) = tx.try_send(event) {
                tracing::trace!(?event, "Progress receiver is lagging, dropping event");
            }
        }
    }
}
