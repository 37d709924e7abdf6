use thiserror::Error;

/// Errors raised while validating or reshaping fingerprint bitmaps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A bit position does not fit on the retina grid.
    #[error("bit position {position} is outside the retina grid of {cells} cells")]
    PositionOutOfRange { position: u32, cells: usize },
    /// Placeholder fill mode string was neither `random` nor `empty`.
    #[error("unknown placeholder mode '{0}' (expected 'random' or 'empty')")]
    UnknownPlaceholderMode(String),
}
