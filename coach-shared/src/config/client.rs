//! Terminal client settings.

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{ConfigError, config_dir};
use crate::language::Locale;

/// Backend used when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Number of cited sources shown under a reply.
pub const DEFAULT_SOURCES_LIMIT: usize = 5;

/// Location of the resource directory document relative to the server root.
pub const RESOURCES_PATH: &str = "static/data/resources-web.json";

/// Settings for the terminal client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Root URL of the support backend; the API lives under `/api`
    pub server_url: Url,

    /// Interface language used when no preference has been saved
    pub language: Locale,

    /// Model provider to request, if the backend offers a choice
    pub provider: Option<String>,

    /// Whether chat requests ask the backend to search uploaded documents
    pub use_rag: bool,

    /// Maximum number of sources listed under a reply
    pub sources_limit: usize,

    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    ///
    /// # Panics
    /// Never in practice; the default URL is a valid constant.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            server_url: Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid"),
            language: Locale::En,
            provider: None,
            use_rag: true,
            sources_limit: DEFAULT_SOURCES_LIMIT,
            log_level: "warn".to_string(),
        }
    }

    /// `<config_dir>/coach/config.yaml`.
    ///
    /// # Errors
    /// Fails when the platform has no configuration directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.yaml"))
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// An explicit `config_path` must exist. Without one, the default path is
    /// used when present. Environment variables only fill values the file
    /// left at their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resolved values are invalid.
    pub fn load_config(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) => Some(path),
            None => Self::default_path()
                .ok()
                .filter(|candidate| candidate.exists()),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::with_defaults(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a YAML or JSON file, chosen by extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, has an unknown
    /// extension, or does not parse.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading client configuration");
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => {
                serde_yml::from_str(&content).map_err(|source| ConfigError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })
            }
            Some("json") => serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Applies `COACH_*` variables to values still at their defaults.
    ///
    /// # Errors
    /// Returns an error when a variable holds an unparseable value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::with_defaults();

        if self.server_url == defaults.server_url
            && let Some(raw) = lookup("COACH_SERVER_URL")
        {
            self.server_url = Url::parse(&raw).map_err(|err| ConfigError::Invalid {
                field: "COACH_SERVER_URL",
                message: err.to_string(),
            })?;
        }
        if self.language == defaults.language
            && let Some(raw) = lookup("COACH_LANGUAGE")
        {
            self.language = raw.parse().map_err(|message| ConfigError::Invalid {
                field: "COACH_LANGUAGE",
                message,
            })?;
        }
        if self.provider.is_none()
            && let Some(raw) = lookup("COACH_PROVIDER")
        {
            let raw = raw.trim();
            if !raw.is_empty() {
                self.provider = Some(raw.to_string());
            }
        }
        if self.log_level == defaults.log_level
            && let Some(raw) = lookup("COACH_LOG_LEVEL")
        {
            self.log_level = raw;
        }
        Ok(())
    }

    /// Checks that the resolved values are usable.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.server_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "server_url",
                message: format!("unsupported scheme '{}'", self.server_url.scheme()),
            });
        }
        if self.sources_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "sources_limit",
                message: "must be at least 1".to_string(),
            });
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "log_level",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Server root with a trailing slash, so relative joins append.
    #[must_use]
    pub fn base_url(&self) -> Url {
        let mut base = self.server_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base
    }

    /// Where the resource directory document is served.
    ///
    /// # Errors
    /// Fails only if the server URL cannot be a base.
    pub fn resources_url(&self) -> Result<Url, url::ParseError> {
        self.base_url().join(RESOURCES_PATH)
    }

    /// Serializes in the format implied by `format` ("yaml" or "json").
    ///
    /// # Errors
    /// Returns an error for unknown formats or serializer failures.
    pub fn render(&self, format: &str) -> Result<String, ConfigError> {
        let path = PathBuf::from(format!("config.{format}"));
        match format {
            "yaml" => serde_yml::to_string(self).map_err(|source| ConfigError::Yaml { path, source }),
            "json" => {
                serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json { path, source })
            }
            _ => Err(ConfigError::UnsupportedFormat(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_with_defaults() {
        let config = ClientConfig::with_defaults();

        assert_eq!(config.server_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.language, Locale::En);
        assert!(config.use_rag);
        assert_eq!(config.sources_limit, 5);
        assert_eq!(config.log_level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "server_url: http://coach.internal:9000\nlanguage: es\nuse_rag: false\nsources_limit: 2\n",
        )
        .unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.server_url.host_str(), Some("coach.internal"));
        assert_eq!(config.language, Locale::Es);
        assert!(!config.use_rag);
        assert_eq!(config.sources_limit, 2);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_json_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"provider":"ollama","log_level":"debug"}"#).unwrap();

        let config = ClientConfig::load_config(Some(path)).unwrap();
        assert_eq!(config.provider.as_deref(), Some("ollama"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "x=1").unwrap();

        let err = ClientConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ClientConfig::load_config(Some(dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_fills_defaults_only() {
        let mut config = ClientConfig::with_defaults();
        config.provider = Some("claude".into());
        config
            .apply_overrides(lookup(&[
                ("COACH_SERVER_URL", "https://coach.example.org/support"),
                ("COACH_LANGUAGE", "es"),
                ("COACH_PROVIDER", "openai"),
                ("COACH_LOG_LEVEL", "info"),
            ]))
            .unwrap();

        assert_eq!(config.server_url.host_str(), Some("coach.example.org"));
        assert_eq!(config.language, Locale::Es);
        assert_eq!(config.provider.as_deref(), Some("claude"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_env_values_are_reported() {
        let mut config = ClientConfig::with_defaults();
        let err = config
            .apply_overrides(lookup(&[("COACH_LANGUAGE", "fr")]))
            .unwrap_err();
        assert!(err.to_string().contains("COACH_LANGUAGE"));

        let mut config = ClientConfig::with_defaults();
        let err = config
            .apply_overrides(lookup(&[("COACH_SERVER_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "COACH_SERVER_URL", .. }));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ClientConfig::with_defaults();
        config.sources_limit = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::with_defaults();
        config.server_url = Url::parse("ftp://files.example.org").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_urls_keep_server_prefix() {
        let mut config = ClientConfig::with_defaults();
        config.server_url = Url::parse("https://example.org/coach").unwrap();
        assert_eq!(config.base_url().as_str(), "https://example.org/coach/");
        assert_eq!(
            config.resources_url().unwrap().as_str(),
            "https://example.org/coach/static/data/resources-web.json"
        );
    }

    #[test]
    fn test_render_formats() {
        let config = ClientConfig::with_defaults();
        let yaml = config.render("yaml").unwrap();
        assert!(yaml.contains("server_url"));
        let json = config.render("json").unwrap();
        assert!(json.contains("\"sources_limit\": 5"));
        assert!(config.render("toml").is_err());
    }
}
