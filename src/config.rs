//! YAML configuration file support.
//!
//! A single file describes how the client is constructed. Anything omitted
//! falls back to [`ClientConfig::default`], and `CORTICAL_*` environment
//! variables win over the file when [`CorticalConfig::with_env_overrides`] is
//! applied.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "research notebook"
//!
//! client:
//!   base_url: "http://api.cortical.io/rest"
//!   retina: "en_associative"
//!   cache_dir: "/var/cache/cortical"
//!   use_cache: true
//!   verbosity: 1
//!   fill_mode: "random"
//!   part_of_speech: "NOUN"
//! ```
//!
//! | Variable              | Field                   |
//! |-----------------------|-------------------------|
//! | `CORTICAL_API_KEY`    | `client.api_key`        |
//! | `CORTICAL_BASE_URL`   | `client.base_url`       |
//! | `CORTICAL_RETINA`     | `client.retina`         |
//! | `CORTICAL_CACHE_DIR`  | `client.cache_dir`      |
//! | `CORTICAL_USE_CACHE`  | `client.use_cache`      |
//! | `CORTICAL_VERBOSITY`  | `client.verbosity`      |
//! | `CORTICAL_FILL_MODE`  | `client.fill_mode`      |

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use client::ClientConfig;
use codec::{PlaceholderMode, RetinaProfile};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {name}: '{value}'")]
    InvalidOverride { name: &'static str, value: String },
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CorticalConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub client: ClientConfig,
}

impl CorticalConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: CorticalConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `CORTICAL_*` variables from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigLoadError> {
        self.with_overrides(|name| env::var(name).ok())
    }

    /// Applies overrides from `lookup`, then re-validates.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client = &mut self.client;
        if let Some(key) = lookup("CORTICAL_API_KEY") {
            client.api_key = Some(key);
        }
        if let Some(url) = lookup("CORTICAL_BASE_URL") {
            client.base_url = url;
        }
        if let Some(retina) = lookup("CORTICAL_RETINA") {
            client.retina = retina;
        }
        if let Some(dir) = lookup("CORTICAL_CACHE_DIR") {
            client.cache_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("CORTICAL_USE_CACHE") {
            client.use_cache = parse_flag(&raw).ok_or(ConfigLoadError::InvalidOverride {
                name: "CORTICAL_USE_CACHE",
                value: raw,
            })?;
        }
        if let Some(raw) = lookup("CORTICAL_VERBOSITY") {
            client.verbosity = raw.trim().parse().map_err(|_| ConfigLoadError::InvalidOverride {
                name: "CORTICAL_VERBOSITY",
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup("CORTICAL_FILL_MODE") {
            client.fill_mode =
                raw.parse::<PlaceholderMode>()
                    .map_err(|_| ConfigLoadError::InvalidOverride {
                        name: "CORTICAL_FILL_MODE",
                        value: raw.clone(),
                    })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Client construction parameters.
    pub fn client_config(&self) -> &ClientConfig {
        &self.client
    }

    pub fn into_client_config(self) -> ClientConfig {
        self.client
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        let client = &self.client;
        if client.base_url.trim().is_empty() {
            return Err(ConfigLoadError::MissingField("client.base_url".to_string()));
        }
        if !(client.base_url.starts_with("http://") || client.base_url.starts_with("https://")) {
            return Err(ConfigLoadError::Validation(format!(
                "client.base_url must start with http:// or https://, got '{}'",
                client.base_url
            )));
        }

        if RetinaProfile::lookup(&client.retina).is_none() {
            let known: Vec<&str> = RetinaProfile::all().iter().map(|r| r.name).collect();
            return Err(ConfigLoadError::Validation(format!(
                "client.retina must be one of: {known:?}"
            )));
        }

        if client.cache_dir.as_os_str().is_empty() {
            return Err(ConfigLoadError::MissingField("client.cache_dir".to_string()));
        }

        if let Some(pos) = &client.part_of_speech {
            if pos.trim().is_empty() {
                return Err(ConfigLoadError::Validation(
                    "client.part_of_speech must not be blank".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl Default for CorticalConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            client: ClientConfig::default(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
