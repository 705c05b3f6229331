//! Preferences the user changes from inside the client.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ConfigError, config_dir};
use crate::language::Locale;

/// Storage key under which the chosen language is saved.
pub const LANGUAGE_KEY: &str = "preferredLanguage";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(rename = "preferredLanguage", default)]
    preferred_language: Option<Locale>,
}

/// File-backed store for settings the user changes from inside the client.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Store backed by the JSON file at `path`; nothing is read yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config_dir>/coach/preferences.json`.
    ///
    /// # Errors
    /// Fails when the platform has no configuration directory.
    pub fn open_default() -> Result<Self, ConfigError> {
        Ok(Self::new(config_dir()?.join("preferences.json")))
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved language, if any. A missing or unreadable file counts as
    /// no preference.
    #[must_use]
    pub fn language(&self) -> Option<Locale> {
        self.read().preferred_language
    }

    /// Language to start in: an explicit choice, else the saved one, else
    /// `fallback` (the configured default).
    #[must_use]
    pub fn resolve_language(&self, explicit: Option<Locale>, fallback: Locale) -> Locale {
        explicit.or_else(|| self.language()).unwrap_or(fallback)
    }

    /// Persists `locale` so later runs start in it.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub fn set_language(&self, locale: Locale) -> Result<(), ConfigError> {
        let mut stored = self.read();
        stored.preferred_language = Some(locale);
        self.write(&stored)
    }

    fn read(&self) -> StoredPreferences {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable preferences");
                StoredPreferences::default()
            }),
            Err(_) => StoredPreferences::default(),
        }
    }

    fn write(&self, stored: &StoredPreferences) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(stored).map_err(|source| ConfigError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, content).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
