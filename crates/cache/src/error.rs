use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Storage failures raised by [`CacheStore`](crate::CacheStore).
///
/// A missing entry is not an error; these cover a cache directory or file
/// that exists but cannot be used.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read cache entry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write cache entry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cache entry {path} is not valid JSON: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize cache value: {0}")]
    Encode(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_path() {
        let err = CacheError::Write {
            path: PathBuf::from("/tmp/cortical/en_synonymous/abc.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to write cache entry"));
        assert!(msg.contains("abc.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn error_exposes_source() {
        use std::error::Error as _;
        let err = CacheError::CreateDir {
            path: PathBuf::from("/nope"),
            source: io::Error::other("boom"),
        };
        assert!(err.source().is_some());
    }
}
