use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelshift_core::{
    load_config_or_defaults, validate_config, Archiver, ConversionTask, DispatchError,
    DispatchEvent, Dispatcher, FfmpegTranscoder, FileLocator, FsArchiver, PathsConfig, Report,
    Reporter, Transcoder,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for the progress event channel. Events beyond it are dropped.
const PROGRESS_BUFFER_SIZE: usize = 4096;

/// Exit status when the run completed but some files failed.
const EXIT_FILES_FAILED: i32 = 2;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    // Initialize logging. Stdout is reserved for progress and the report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("reelshift {}", VERSION);

    // Determine config path
    let config_path = std::env::var("REELSHIFT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("reelshift.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_defaults(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(hash = &config_hash[..16], "Configuration loaded successfully");
    info!("Source root: {:?}", config.paths.source_root);
    info!("Archive directory: {:?}", config.paths.archive_dir);
    info!(
        "Converting .{} to .{} with {} workers",
        config.paths.source_extension, config.paths.target_extension, config.dispatcher.workers
    );

    // Create transcoder
    let transcoder = FfmpegTranscoder::new(config.transcoder.clone());
    transcoder
        .validate()
        .await
        .with_context(|| format!("{} is not usable", transcoder.name()))?;
    info!("Transcoder initialized: {:?}", config.transcoder.ffmpeg_path);

    // Create archive directory
    let archiver = FsArchiver::new(config.paths.archive_dir.clone(), config.archive.clone());
    archiver
        .prepare()
        .await
        .context("Failed to prepare archive directory")?;
    info!("Archive directory ready");

    let task = ConversionTask::new(
        Arc::new(transcoder),
        Arc::new(archiver),
        config.encoding,
        &config.paths.target_extension,
    );
    let dispatcher =
        Dispatcher::new(config.dispatcher.clone(), task).context("Failed to create dispatcher")?;

    let locator = source_locator(&config.paths)?;

    // Console progress
    let (progress_tx, progress_rx) = mpsc::channel(PROGRESS_BUFFER_SIZE);
    let printer_handle = tokio::spawn(print_progress(progress_rx));

    println!("{}", start_message(&config.paths, dispatcher.workers()));
    let result = dispatcher.run(locator.locate(), Some(progress_tx)).await;
    if let Err(e) = printer_handle.await {
        error!("Progress printer failed: {}", e);
    }

    let reporter = Reporter::new(config.report.clone());
    match result {
        Ok(report) => {
            println!("\n{}", reporter.render(&report));
            println!("Process finished.");
            Ok(exit_code(&report))
        }
        Err(DispatchError::DiscoveryAborted { error, partial }) => {
            println!("\n{}", reporter.render(&partial));
            Err(error).context("Discovery aborted the run")
        }
        Err(e) => Err(e).context("Dispatch failed"),
    }
}

/// Builds the locator, failing if the source root cannot be read at all.
fn source_locator(paths: &PathsConfig) -> Result<FileLocator> {
    let locator =
        FileLocator::new(&paths.source_root, &paths.source_extension).excluding(&paths.archive_dir);
    locator
        .check_root()
        .with_context(|| format!("Source root {:?} is not readable", paths.source_root))?;
    Ok(locator)
}

fn start_message(paths: &PathsConfig, workers: usize) -> String {
    format!(
        "Starting conversion of {} ({} workers)...",
        paths.source_root.display(),
        workers
    )
}

async fn print_progress(mut progress_rx: mpsc::Receiver<DispatchEvent>) {
    while let Some(event) = progress_rx.recv().await {
        if let DispatchEvent::Started { source } = event {
            println!("Converting {} ...", source);
        }
    }
}

fn exit_code(report: &Report) -> i32 {
    if report.has_failures() {
        EXIT_FILES_FAILED
    } else {
        0
    }
}
