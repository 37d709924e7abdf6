use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{CodecError, FingerprintBitmap};

/// How to fill in a fingerprint the service could not produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderMode {
    /// Pseudo-random positions seeded from the subject text.
    #[default]
    Random,
    /// No ON bits.
    Empty,
}

impl PlaceholderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderMode::Random => "random",
            PlaceholderMode::Empty => "empty",
        }
    }
}

impl fmt::Display for PlaceholderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceholderMode {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(PlaceholderMode::Random),
            "empty" => Ok(PlaceholderMode::Empty),
            _ => Err(CodecError::UnknownPlaceholderMode(s.to_string())),
        }
    }
}

/// Substitute bitmap for `seed_text` when no remote encoding exists.
///
/// In [`PlaceholderMode::Random`] this samples `floor(cells * target_sparsity)`
/// distinct positions from `[0, width * height)` and returns them sorted. The
/// generator is built per call from a SHA-256 digest of `seed_text`, so the
/// same text yields the same bitmap in every process and nothing else shares
/// its state. `target_sparsity` is clamped to `[0, 1]`.
pub fn placeholder_fingerprint(
    seed_text: &str,
    mode: PlaceholderMode,
    width: u32,
    height: u32,
    target_sparsity: f64,
) -> FingerprintBitmap {
    match mode {
        PlaceholderMode::Empty => FingerprintBitmap::empty(),
        PlaceholderMode::Random => {
            let cells = width as usize * height as usize;
            let sparsity = if target_sparsity.is_finite() {
                target_sparsity.clamp(0.0, 1.0)
            } else {
                0.0
            };
            let amount = ((cells as f64 * sparsity).floor() as usize).min(cells);
            if amount == 0 {
                return FingerprintBitmap::empty();
            }

            let mut rng = seeded_rng(seed_text);
            rand::seq::index::sample(&mut rng, cells, amount)
                .into_iter()
                .map(|position| position as u32)
                .collect()
        }
    }
}

fn seeded_rng(seed_text: &str) -> ChaCha8Rng {
    let digest = Sha256::digest(seed_text.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    ChaCha8Rng::from_seed(seed)
}
