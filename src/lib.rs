//! Workspace umbrella crate for the Cortical SDR client.
//!
//! Re-exports the fingerprint codec, the response cache, and the service
//! client so callers need a single dependency, and adds YAML-driven setup on
//! top.

pub mod config;

pub use cache::{
    CacheError, CacheKey, CacheStore, Lookup, Method, RequestDescriptor, compute_key,
};
pub use client::{
    API_KEY_ENV, ClientConfig, ClientError, ComparisonResult, CorticalClient, DEFAULT_BASE_URL,
    DEFAULT_CACHE_DIR, FingerprintInfo, Gateway, HttpTransport, Outcome, SimilarTerm, SoftFault,
    TermContext, Transport, TransportError, TransportRequest, TransportResponse,
};
pub use codec::{
    CodecError, DEFAULT_RETINA, Fingerprint, FingerprintBitmap, PlaceholderMode, RetinaProfile,
    TARGET_SPARSITY, expand_to_binary_string, placeholder_fingerprint, sparsity_percent,
};
pub use config::{ConfigLoadError, CorticalConfig};

use std::error::Error;
use std::fmt;
use std::path::Path;

/// Errors from building a client out of a configuration file.
#[derive(Debug)]
pub enum SetupError {
    Config(ConfigLoadError),
    Client(ClientError),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Config(err) => write!(f, "configuration failure: {err}"),
            SetupError::Client(err) => write!(f, "client construction failed: {err}"),
        }
    }
}

impl Error for SetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SetupError::Config(err) => Some(err),
            SetupError::Client(err) => Some(err),
        }
    }
}

impl From<ConfigLoadError> for SetupError {
    fn from(value: ConfigLoadError) -> Self {
        SetupError::Config(value)
    }
}

impl From<ClientError> for SetupError {
    fn from(value: ClientError) -> Self {
        SetupError::Client(value)
    }
}

/// Loads `path`, applies `CORTICAL_*` environment overrides, and builds an
/// HTTP client from the result.
pub fn client_from_file<P: AsRef<Path>>(path: P) -> Result<CorticalClient, SetupError> {
    let config = CorticalConfig::from_file(path)?.with_env_overrides()?;
    Ok(CorticalClient::new(config.into_client_config())?)
}

/// Builds a client over `transport` from an already loaded configuration.
pub fn client_with_transport<T: Transport>(
    config: &CorticalConfig,
    transport: T,
) -> Result<CorticalClient<T>, SetupError> {
    Ok(CorticalClient::with_transport(
        config.client_config().clone(),
        transport,
    )?)
}
