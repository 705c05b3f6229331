//! # Configuration
//!
//! Client settings loaded from file, environment, and flags, plus the small
//! preference store that remembers the chosen interface language.

pub mod client;
pub mod preferences;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or persisting client settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("failed to access {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// YAML content did not match the expected shape
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        /// File being parsed or rendered.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_yml::Error,
    },

    /// JSON content did not match the expected shape
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File being parsed or rendered.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The file extension is neither yaml nor json
    #[error("unsupported configuration format for {0}; use .yaml, .yml or .json")]
    UnsupportedFormat(PathBuf),

    /// A value failed validation
    #[error("invalid {field}: {message}")]
    Invalid {
        /// Setting or variable that was rejected.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// No per-user configuration directory exists on this platform
    #[error("could not determine the configuration directory")]
    NoConfigDir,
}

/// `<config_dir>/coach`, where the config and preference files live.
///
/// # Errors
/// Returns [`ConfigError::NoConfigDir`] when the platform has no home directory.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("coach"))
        .ok_or(ConfigError::NoConfigDir)
}
