//! On-disk response cache for the encoding service client.
//!
//! Every outbound call is described by a [`RequestDescriptor`]. The descriptor
//! hashes to a [`CacheKey`] through a canonical, order-independent encoding,
//! and the [`CacheStore`] keeps one JSON file per key. Entries are written once
//! and never evicted.
//!
//! ```rust
//! use cache::{compute_key, Method, RequestDescriptor};
//!
//! let a = RequestDescriptor::new(Method::Get, "/terms")
//!     .param("term", "owl")
//!     .param("retina_name", "en_synonymous");
//! let b = RequestDescriptor::new(Method::Get, "/terms")
//!     .param("retina_name", "en_synonymous")
//!     .param("term", "owl");
//! assert_eq!(compute_key(&a), compute_key(&b));
//! ```

mod descriptor;
mod error;
mod key;
mod store;

pub use crate::descriptor::{Method, ParseMethodError, RequestDescriptor};
pub use crate::error::CacheError;
pub use crate::key::{compute_key, CacheKey, KEY_ENCODING_VERSION};
pub use crate::store::{CacheStore, Lookup};
