//! Cache key derivation for request descriptors.
//!
//! # Algorithm
//!
//! ```text
//! SHA-256(
//!     version.to_be_bytes()
//!     || field(method) || field(path)
//!     || count(params) || for each (k, v) in sorted order: field(k) || field(v)
//!     || body_tag || [field(body)]
//! )
//! ```
//!
//! - `field(x)`: 8-byte big-endian length of `x` followed by its UTF-8 bytes.
//!   Length prefixes make the encoding unambiguous without any escaping, so
//!   `("a=b", "")` and `("a", "=b")` never collide.
//! - `count(params)`: 8-byte big-endian number of query parameters.
//! - `body_tag`: `0x00` for no body, `0x01` followed by `field(body)` otherwise.
//!   An absent body and an empty body therefore hash differently.
//!
//! The encoding version is mixed in first so a future change to the layout
//! cannot silently reuse entries written under the old one.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::RequestDescriptor;

/// Version of the canonical descriptor encoding.
pub const KEY_ENCODING_VERSION: u32 = 1;

const BODY_ABSENT: u8 = 0x00;
const BODY_PRESENT: u8 = 0x01;

/// Hex SHA-256 digest identifying one cached response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the stable cache key of `descriptor`.
///
/// Pure function of the descriptor: the same logical request yields the same
/// 64-character key in every process, and changing the method, the path, any
/// query parameter, or the body changes it.
pub fn compute_key(descriptor: &RequestDescriptor) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(KEY_ENCODING_VERSION.to_be_bytes());
    write_field(&mut hasher, descriptor.method.as_str());
    write_field(&mut hasher, &descriptor.path);

    hasher.update((descriptor.query.len() as u64).to_be_bytes());
    for (key, value) in &descriptor.query {
        write_field(&mut hasher, key);
        write_field(&mut hasher, value);
    }

    match descriptor.body.as_deref() {
        None => hasher.update([BODY_ABSENT]),
        Some(body) => {
            hasher.update([BODY_PRESENT]);
            write_field(&mut hasher, body);
        }
    }

    CacheKey(hex::encode(hasher.finalize()))
}

fn write_field(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}
