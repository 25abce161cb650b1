use super::{types::Config, ConfigError};
use crate::locator::normalize_extension;

fn invalid(message: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::ValidationError(message.into()))
}

/// Validate configuration
/// Currently validates:
/// - at least one worker
/// - source and target extensions are set and differ
/// - the archive directory is not the source root
/// - a positive audio bitrate and copy buffer
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.dispatcher.workers == 0 {
        return invalid("dispatcher.workers must be at least 1");
    }

    let source = normalize_extension(&config.paths.source_extension);
    let target = normalize_extension(&config.paths.target_extension);
    if source.is_empty() {
        return invalid("paths.source_extension cannot be empty");
    }
    if target.is_empty() {
        return invalid("paths.target_extension cannot be empty");
    }
    if source == target {
        return invalid(format!(
            "paths.source_extension and paths.target_extension are both '{}'",
            source
        ));
    }

    if config.paths.source_root.as_os_str().is_empty() {
        return invalid("paths.source_root cannot be empty");
    }
    if config.paths.archive_dir.as_os_str().is_empty() {
        return invalid("paths.archive_dir cannot be empty");
    }
    if config.paths.archive_dir == config.paths.source_root {
        return invalid("paths.archive_dir cannot be the same as paths.source_root");
    }

    if config.encoding.audio_bitrate_kbps == 0 {
        return invalid("encoding.audio_bitrate_kbps must be positive");
    }
    if config.archive.buffer_size == 0 {
        return invalid("archive.buffer_size must be positive");
    }

    Ok(())
}
