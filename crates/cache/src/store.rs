use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::{CacheError, CacheKey};

/// Result of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Hit(T),
    Miss,
}

impl<T> Lookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss => None,
        }
    }
}

/// Directory of `<key>.json` files, one per cached response.
///
/// Construction is free: the directory is only created by the first
/// [`put`](Self::put). A disabled store misses every read and drops every write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStore {
    root: PathBuf,
    enabled: bool,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            root: root.into(),
            enabled,
        }
    }

    /// Store that never reads or writes.
    pub fn disabled() -> Self {
        Self::new(PathBuf::new(), false)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// File backing `key`.
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Reads the entry for `key`. Absence is [`Lookup::Miss`], never an error.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Lookup<T>, CacheError> {
        if !self.enabled {
            return Ok(Lookup::Miss);
        }

        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(key = %key, "cache_miss");
                return Ok(Lookup::Miss);
            }
            Err(source) => return Err(CacheError::Read { path, source }),
        };

        let value = serde_json::from_slice(&bytes)
            .map_err(|source| CacheError::Decode { path, source })?;
        debug!(key = %key, "cache_hit");
        Ok(Lookup::Hit(value))
    }

    /// Writes `value` under `key`, creating the cache directory on first use.
    pub fn put<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }

        if !self.root.exists() {
            info!(path = %self.root.display(), "cache_create_dir");
            fs::create_dir_all(&self.root).map_err(|source| CacheError::CreateDir {
                path: self.root.clone(),
                source,
            })?;
        }

        let bytes = serde_json::to_vec(value).map_err(CacheError::Encode)?;
        let path = self.entry_path(key);
        fs::write(&path, bytes).map_err(|source| CacheError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(key = %key, path = %path.display(), "cache_write");
        Ok(())
    }
}
