use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides. Nested keys use `__`,
/// e.g. `REELSHIFT_DISPATCHER__WORKERS=8`.
pub const ENV_PREFIX: &str = "REELSHIFT_";

fn env() -> Env {
    Env::prefixed(ENV_PREFIX).split("__")
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(env()),
    )
}

/// Like [`load_config`], but a missing file means built-in defaults
/// (still subject to environment overrides).
pub fn load_config_or_defaults(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    extract(Figment::from(Serialized::defaults(Config::default())).merge(env()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::DiscoveryPolicy;
    use figment::Jail;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[dispatcher]
workers = 6
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.dispatcher.workers, 6);
        assert_eq!(config.paths.source_extension, "mkv");
    }

    #[test]
    fn test_load_config_from_str_bad_value() {
        let toml = r#"
[archive]
collision = "rename"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/reelshift.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[paths]
source_root = "/media/in"
archive_dir = "/media/in/originals"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.paths.source_root, PathBuf::from("/media/in"));
        assert_eq!(config.dispatcher.workers, 4);
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "reelshift.toml",
                r#"
[dispatcher]
workers = 2
"#,
            )?;
            jail.set_env("REELSHIFT_DISPATCHER__WORKERS", "8");
            jail.set_env("REELSHIFT_DISPATCHER__ON_DISCOVERY_ERROR", "abort");
            jail.set_env("REELSHIFT_PATHS__SOURCE_ROOT", "/env/root");

            let config = load_config(Path::new("reelshift.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.dispatcher.workers, 8);
            assert_eq!(config.dispatcher.on_discovery_error, DiscoveryPolicy::Abort);
            assert_eq!(config.paths.source_root, PathBuf::from("/env/root"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("REELSHIFT_ENCODING__AUDIO_BITRATE_KBPS", "256");

            let config =
                load_config_or_defaults(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.encoding.audio_bitrate_kbps, 256);
            assert_eq!(config.paths.archive_dir, PathBuf::from("/srv/media/convert/originals"));
            Ok(())
        });
    }
}
