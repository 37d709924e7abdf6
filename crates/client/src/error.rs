use cache::{CacheError, ParseMethodError};
use codec::CodecError;
use thiserror::Error;

/// Errors surfaced by [`CorticalClient`](crate::CorticalClient).
///
/// Non-200 statuses and unparseable payloads are not errors; the gateway turns
/// them into empty results (see [`Outcome`](crate::Outcome)).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The caller broke a precondition (multi-token term, empty bitmap, bad method).
    #[error("usage error: {0}")]
    Usage(String),
    /// No credential configured and none in the environment.
    #[error("missing api key: set `api_key` or the CORTICAL_API_KEY environment variable")]
    MissingApiKey,
    /// Retina name is not in the profile table.
    #[error("unknown retina '{0}'")]
    UnknownRetina(String),
    /// The transport produced no response at all.
    #[error("encoding service unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },
    /// Cache directory or entry could not be used.
    #[error("cache storage failure: {0}")]
    Storage(#[from] CacheError),
    /// A bitmap does not fit the retina grid.
    #[error("fingerprint error: {0}")]
    Codec(#[from] CodecError),
}

impl ClientError {
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ClientError::Usage(_) | ClientError::MissingApiKey | ClientError::UnknownRetina(_)
        )
    }
}

impl From<ParseMethodError> for ClientError {
    fn from(err: ParseMethodError) -> Self {
        ClientError::Usage(err.to_string())
    }
}
