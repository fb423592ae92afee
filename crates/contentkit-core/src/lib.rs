//! Core library for contentkit.
//!
//! This crate provides:
//! - Quote-aware command-line tokenizing and parameter mapping
//! - GUID tagging of content file names
//! - File-name cleanup, MIME lookup and path-separator helpers
//! - Text and digest helpers
//! - Configuration loading, path resolution and schema generation

pub mod cmdline;
pub mod config;
pub mod error;
pub mod filename;
pub mod files;
pub mod hash;
pub mod paths;
pub mod schema;
pub mod text;

pub use cmdline::{CommandLine, Parameters, Tokenized};
pub use config::{AppConfig, HashConfig, LogLevel, LoggingConfig, NamesConfig};
pub use error::{CoreError, Result};
pub use hash::HashMethod;
pub use paths::AppPaths;
pub use schema::generate_schema;

/// Application name used for config directories and environment prefix.
pub const APP_NAME: &str = "contentkit";

/// Repository URL used in generated schema identifiers.
pub const REPO_URL: &str = "https://github.com/byteowlz/contentkit";

/// Returns the environment variable prefix for this application.
#[must_use]
pub fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_prefix_is_upper_snake() {
        assert_eq!(env_prefix(), "CONTENTKIT");
    }
}
