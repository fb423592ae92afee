//! XDG-compliant config file discovery.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::{APP_NAME, AppConfig};

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Resolved application paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Configuration file, which may not exist yet.
    pub config_file: PathBuf,
}

impl AppPaths {
    /// Discover application paths, optionally overriding the config file location.
    ///
    /// An override that names a directory resolves to `config.toml` inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be expanded or no config directory
    /// can be determined.
    pub fn discover(override_path: Option<PathBuf>) -> Result<Self> {
        let config_file = match override_path {
            Some(path) => {
                let expanded = expand_path(path)?;
                if expanded.is_dir() {
                    expanded.join(CONFIG_FILENAME)
                } else {
                    expanded
                }
            }
            None => default_config_dir()?.join(CONFIG_FILENAME),
        };

        if config_file.parent().is_none() {
            return Err(anyhow!("invalid config file path: {config_file:?}"));
        }

        Ok(Self { config_file })
    }
}

impl std::fmt::Display for AppPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "config: {}", self.config_file.display())
    }
}

/// Expand a `PathBuf`, resolving `~` and environment variables.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set.
pub fn expand_path(path: PathBuf) -> Result<PathBuf> {
    if let Some(text) = path.to_str() {
        expand_str_path(text)
    } else {
        Ok(path)
    }
}

/// Expand a string path, resolving `~` and environment variables.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set.
pub fn expand_str_path(text: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(text).context("expanding path")?;
    Ok(PathBuf::from(expanded.to_string()))
}

/// Get the default configuration directory (`XDG_CONFIG_HOME` or fallback).
///
/// # Errors
///
/// Returns an error if no home or config directory can be determined.
pub fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        let mut path = PathBuf::from(dir);
        path.push(APP_NAME);
        return Ok(path);
    }

    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}

/// Write the default configuration file to the specified path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }

    let config = AppConfig::default();
    let toml_str = toml::to_string_pretty(&config).context("serializing default config to TOML")?;
    let mut body = default_config_header(path);
    body.push_str(&toml_str);
    fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))?;
    log::info!("wrote default config to {}", path.display());
    Ok(())
}

fn default_config_header(path: &Path) -> String {
    format!(
        "# Configuration for {APP_NAME}\n# File: {}\n\n",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_override_resolves_to_config_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = AppPaths::discover(Some(dir.path().to_path_buf())).expect("discover");
        assert_eq!(paths.config_file, dir.path().join(CONFIG_FILENAME));
    }

    #[test]
    fn file_override_is_kept() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join("custom.toml");
        let paths = AppPaths::discover(Some(file.clone())).expect("discover");
        assert_eq!(paths.config_file, file);
    }

    #[test]
    fn default_config_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join(CONFIG_FILENAME);
        write_default_config(&path).expect("write");

        let body = fs::read_to_string(&path).expect("read");
        assert!(body.starts_with("# Configuration for contentkit"));
        assert!(body.contains("[names]"));
        assert!(body.contains("[hash]"));

        let loaded = AppConfig::load_from_path(&path).expect("load");
        assert_eq!(loaded.names.default_extension, ".xml");
    }
}
