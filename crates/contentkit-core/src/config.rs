//! Configuration types and loading for the application.

use std::path::Path;

use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::env_prefix;
use crate::filename::DEFAULT_EXTENSION;
use crate::hash::HashMethod;
use crate::paths::{AppPaths, write_default_config};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(
    title = "Application Configuration",
    description = "Main configuration for contentkit"
)]
pub struct AppConfig {
    /// JSON Schema reference for editor support.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub schema: Option<String>,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// File-name tagging configuration.
    pub names: NamesConfig,

    /// Digest defaults.
    pub hash: HashConfig,
}

impl AppConfig {
    /// Load configuration from file and environment, creating defaults if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed, or written.
    pub fn load(paths: &AppPaths, dry_run: bool) -> Result<Self> {
        if !paths.config_file.exists() {
            if dry_run {
                log::info!(
                    "dry-run: would create default config at {}",
                    paths.config_file.display()
                );
            } else {
                write_default_config(&paths.config_file)?;
            }
        }

        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load_from_path(config_file: &Path) -> Result<Self> {
        let env_prefix = env_prefix();
        let built = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("names.default_extension", DEFAULT_EXTENSION)?
            .set_default("hash.method", "sha256")?
            .set_default("hash.max_length", 0_i64)?
            .add_source(
                File::from(config_file)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(env_prefix.as_str()).separator("__"))
            .build()?;

        let config: Self = built.try_deserialize()?;
        log::debug!("loaded configuration from {}", config_file.display());
        Ok(config)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(description = "Logging configuration")]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace).
    #[schemars(default = "default_log_level")]
    pub level: LogLevel,
}

/// Log level enumeration for schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only emit error-level messages.
    Error,
    /// Emit warnings and errors.
    Warn,
    /// Emit informational messages and above (default).
    #[default]
    Info,
    /// Emit debug diagnostics and above.
    Debug,
    /// Emit all messages including fine-grained traces.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

const fn default_log_level() -> LogLevel {
    LogLevel::Info
}

/// File-name tagging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(description = "File-name GUID tagging configuration")]
pub struct NamesConfig {
    /// Extension given to names that have no file-name component when tagged (default: .xml).
    pub default_extension: String,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            default_extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Digest defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[schemars(description = "Digest defaults")]
pub struct HashConfig {
    /// Digest algorithm (sha256 or sha512).
    pub method: HashMethod,

    /// Keep only this many leading digest bytes; 0 keeps the full digest.
    pub max_length: usize,
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn defaults_apply_without_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = AppConfig::load_from_path(&dir.path().join("missing.toml")).expect("load");
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.names.default_extension, ".xml");
        assert_eq!(config.hash.method, HashMethod::Sha256);
        assert_eq!(config.hash.max_length, 0);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[logging]\nlevel = \"debug\"\n\n[names]\ndefault_extension = \".dita\"\n\n[hash]\nmethod = \"sha512\"\nmax_length = 8\n",
        )
        .expect("write config");

        let config = AppConfig::load_from_path(&path).expect("load");
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.names.default_extension, ".dita");
        assert_eq!(config.hash.method, HashMethod::Sha512);
        assert_eq!(config.hash.max_length, 8);
    }

    #[test]
    fn log_level_maps_to_filter() {
        assert_eq!(log::LevelFilter::from(LogLevel::Warn), log::LevelFilter::Warn);
    }
}
