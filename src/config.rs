//! Process-wide configuration
//!
//! ```json
//! {
//!   "versions_dir": "/var/lib/lexicon/versions",
//!   "versions_url": "https://bucket.example.org/",
//!   "default_version": "dictionary_2020-01-01_00:00:00",
//!   "languages": ["en", "fr"]
//! }
//! ```
//!
//! Only `versions_dir` is required.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{LexiconError, LexiconResult};
use crate::observability::{log_event_with_fields, Event};
use crate::store::{remote_from_location, RemoteSource, VersionStore};
use crate::version::VersionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Local snapshot and graph artifact directory (required)
    pub versions_dir: PathBuf,

    /// Remote base location (`http(s)://`, `file://` or a directory path)
    #[serde(default)]
    pub versions_url: Option<String>,

    /// Identifier the default version resolves to
    #[serde(default)]
    pub default_version: Option<String>,

    /// Languages every term must be translated in
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string(), "fr".to_string()]
}

impl Config {
    /// Configuration with defaults for everything but the directory
    pub fn new(versions_dir: impl Into<PathBuf>) -> Self {
        Self {
            versions_dir: versions_dir.into(),
            versions_url: None,
            default_version: None,
            languages: default_languages(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> LexiconResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LexiconError::Configuration(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| LexiconError::Configuration(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        log_event_with_fields(Event::ConfigLoaded, &[("path", &path.display().to_string())]);

        Ok(config)
    }

    pub fn validate(&self) -> LexiconResult<()> {
        if self.versions_dir.as_os_str().is_empty() {
            return Err(LexiconError::Configuration("versions_dir must not be empty".to_string()));
        }

        if self.languages.is_empty() {
            return Err(LexiconError::Configuration("languages must not be empty".to_string()));
        }
        if let Some(language) = self.languages.iter().find(|l| l.trim().is_empty()) {
            return Err(LexiconError::Configuration(format!(
                "invalid language code {:?}",
                language
            )));
        }

        if let Some(default) = &self.default_version {
            VersionId::parse(default).map_err(|_| {
                LexiconError::Configuration(format!("Invalid default_version: {:?}", default))
            })?;
        }

        if let Some(url) = &self.versions_url {
            if url.trim().is_empty() {
                return Err(LexiconError::Configuration("versions_url must not be empty".to_string()));
            }
        }

        Ok(())
    }

    pub fn with_versions_url(mut self, url: impl Into<String>) -> Self {
        self.versions_url = Some(url.into());
        self
    }

    pub fn with_default_version(mut self, identifier: impl Into<String>) -> Self {
        self.default_version = Some(identifier.into());
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Remote source for `versions_url`, if configured
    pub fn remote(&self) -> LexiconResult<Option<Box<dyn RemoteSource>>> {
        self.versions_url
            .as_deref()
            .map(remote_from_location)
            .transpose()
    }

    /// Open the version store this configuration describes
    pub fn open_store(&self) -> LexiconResult<VersionStore> {
        VersionStore::new(&self.versions_dir, self.remote()?)
    }
}
