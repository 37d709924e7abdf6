//! Fingerprint codec for semantic SDRs.
//!
//! A fingerprint is a sparse set of ON positions on a `width x height` retina
//! grid. This crate owns the local half of fingerprint handling:
//!
//! - [`FingerprintBitmap`] keeps positions sorted and unique.
//! - [`expand_to_binary_string`] renders a bitmap as a dense `'0'`/`'1'` string.
//! - [`placeholder_fingerprint`] fabricates a stable bitmap for text the remote
//!   service could not encode, seeded from the text alone.
//! - [`RetinaProfile`] maps the named retinas to their grid dimensions.
//!
//! ## Quick example
//!
//! ```rust
//! use codec::{expand_to_binary_string, FingerprintBitmap};
//!
//! let bitmap = FingerprintBitmap::from_positions(vec![13, 0]);
//! let sdr = expand_to_binary_string(&bitmap, 4, 4).unwrap();
//! assert_eq!(sdr, "1000000000000100");
//! ```

mod bitmap;
mod error;
mod expand;
mod placeholder;
mod retina;

pub use crate::bitmap::{sparsity_percent, Fingerprint, FingerprintBitmap};
pub use crate::error::CodecError;
pub use crate::expand::expand_to_binary_string;
pub use crate::placeholder::{placeholder_fingerprint, PlaceholderMode};
pub use crate::retina::{RetinaProfile, DEFAULT_RETINA, TARGET_SPARSITY};
