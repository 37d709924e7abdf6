use serde::{Deserialize, Serialize};

use crate::CodecError;

/// Sorted, duplicate-free list of ON bit positions.
///
/// Construction always normalizes the input, so two bitmaps with the same set
/// of positions compare equal regardless of the order they were built from.
/// There is no mutable access to the positions once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<u32>", into = "Vec<u32>")]
pub struct FingerprintBitmap {
    positions: Vec<u32>,
}

impl FingerprintBitmap {
    /// Builds a bitmap from positions in any order; duplicates collapse.
    pub fn from_positions(mut positions: Vec<u32>) -> Self {
        positions.sort_unstable();
        positions.dedup();
        Self { positions }
    }

    /// Bitmap with no ON bits.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a bitmap and checks every position fits in `cells`.
    pub fn within(positions: Vec<u32>, cells: usize) -> Result<Self, CodecError> {
        let bitmap = Self::from_positions(positions);
        bitmap.validate(cells)?;
        Ok(bitmap)
    }

    /// Fails on the first position `>= cells`.
    pub fn validate(&self, cells: usize) -> Result<(), CodecError> {
        // Sorted, so only the last element can be out of range.
        match self.positions.last() {
            Some(&position) if position as usize >= cells => {
                Err(CodecError::PositionOutOfRange { position, cells })
            }
            _ => Ok(()),
        }
    }

    #[inline]
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn contains(&self, position: u32) -> bool {
        self.positions.binary_search(&position).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.positions.iter().copied()
    }
}

impl From<Vec<u32>> for FingerprintBitmap {
    fn from(positions: Vec<u32>) -> Self {
        Self::from_positions(positions)
    }
}

impl From<FingerprintBitmap> for Vec<u32> {
    fn from(bitmap: FingerprintBitmap) -> Self {
        bitmap.positions
    }
}

impl FromIterator<u32> for FingerprintBitmap {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self::from_positions(iter.into_iter().collect())
    }
}

/// Wire shape of a fingerprint: `{"positions": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub positions: FingerprintBitmap,
}

impl From<FingerprintBitmap> for Fingerprint {
    fn from(positions: FingerprintBitmap) -> Self {
        Self { positions }
    }
}

/// Percentage of ON cells, rounded to the nearest whole number.
///
/// An empty grid reports 0 instead of dividing by zero.
pub fn sparsity_percent(on_bits: usize, width: u32, height: u32) -> f64 {
    let cells = width as f64 * height as f64;
    if cells == 0.0 {
        return 0.0;
    }
    (on_bits as f64 / cells * 100.0).round()
}
