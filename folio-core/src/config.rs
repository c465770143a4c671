//! Site configuration loading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the folio.yml schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub default_author: DefaultAuthorConfig,

    /// Per-extension enable flag, keyed by extension name.
    /// Extensions absent from the map stay enabled.
    #[serde(default)]
    pub extensions: BTreeMap<String, bool>,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: String::from("folio"),
            description: String::new(),
            url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Content root holding the posts/pages/authors subdirectories
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Where the serialized database document is written
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

fn default_source() -> PathBuf {
    PathBuf::from("source")
}

fn default_database() -> PathBuf {
    PathBuf::from("database.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            database: default_database(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultAuthorConfig {
    #[serde(default = "default_author_name")]
    pub name: String,

    #[serde(default)]
    pub description: String,
}

fn default_author_name() -> String {
    String::from("admin")
}

impl Default for DefaultAuthorConfig {
    fn default() -> Self {
        Self {
            name: default_author_name(),
            description: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Default configuration rooted at the given content directory
    pub fn with_source(source: impl Into<PathBuf>) -> Self {
        Self {
            paths: PathsConfig {
                source: source.into(),
                database: default_database(),
            },
            ..Self::default()
        }
    }

    /// Content root, resolved relative to the config file
    pub fn source_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.source)
    }

    /// Output path of the database document, resolved relative to the config file
    pub fn database_path(&self) -> PathBuf {
        self.resolve_path(&self.paths.database)
    }

    /// Whether the named extension should be loaded
    pub fn extension_enabled(&self, name: &str) -> bool {
        self.extensions.get(name).copied().unwrap_or(true)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.config_path.as_ref().and_then(|p| p.parent()) {
            Some(parent) => parent.join(path),
            None => path.to_path_buf(),
        }
    }
}
