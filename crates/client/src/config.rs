use std::env;
use std::path::PathBuf;

use codec::{PlaceholderMode, RetinaProfile, DEFAULT_RETINA};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::ClientError;

/// Root of the encoding service REST API.
pub const DEFAULT_BASE_URL: &str = "http://api.cortical.io/rest";
/// Parent directory for per-retina cache directories.
pub const DEFAULT_CACHE_DIR: &str = "/tmp/cortical";
/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "CORTICAL_API_KEY";

/// Construction parameters for [`CorticalClient`](crate::CorticalClient).
///
/// # Example
/// ```no_run
/// use client::{ClientConfig, CorticalClient};
///
/// let cfg = ClientConfig {
///     api_key: Some("your-api-key".into()),
///     retina: "en_associative".into(),
///     use_cache: false,
///     ..Default::default()
/// };
///
/// let client = CorticalClient::new(cfg).unwrap();
/// let info = client.fingerprint_for_term("owl").unwrap();
/// println!("{} bits on", info.bitmap().len());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Credential sent as the `api-key` header. Falls back to `CORTICAL_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Service root; request paths such as `/terms` are appended verbatim.
    pub base_url: String,
    /// Named retina; must be one of [`RetinaProfile::all`].
    pub retina: String,
    /// Cache parent directory. Entries land in `<cache_dir>/<retina>/`.
    pub cache_dir: PathBuf,
    /// Read-through/write-through caching of every response.
    pub use_cache: bool,
    /// 0 = warnings only, 1 = progress, 2+ = cache-level detail.
    pub verbosity: u8,
    /// Fill used when the service returns no fingerprint.
    pub fill_mode: PlaceholderMode,
    /// Optional part-of-speech filter for nearest-term lookups (e.g. `NOUN`).
    pub part_of_speech: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            retina: DEFAULT_RETINA.into(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            use_cache: true,
            verbosity: 0,
            fill_mode: PlaceholderMode::Random,
            part_of_speech: None,
        }
    }
}

impl ClientConfig {
    /// Configured key, or the `CORTICAL_API_KEY` environment variable.
    pub fn resolve_api_key(&self) -> Result<String, ClientError> {
        let key = match self.api_key.as_deref() {
            Some(key) => key.to_string(),
            None => env::var(API_KEY_ENV).map_err(|_| ClientError::MissingApiKey)?,
        };
        if key.trim().is_empty() {
            return Err(ClientError::MissingApiKey);
        }
        Ok(key)
    }

    pub fn retina_profile(&self) -> Result<RetinaProfile, ClientError> {
        RetinaProfile::lookup(&self.retina)
            .ok_or_else(|| ClientError::UnknownRetina(self.retina.clone()))
    }

    /// Directory holding this retina's cache entries.
    pub fn cache_root(&self) -> PathBuf {
        self.cache_dir.join(&self.retina)
    }

    /// Default log level implied by [`verbosity`](Self::verbosity).
    pub fn log_level(&self) -> Level {
        match self.verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    }
}
