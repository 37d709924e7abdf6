/// Retina used when a client does not pick one.
pub const DEFAULT_RETINA: &str = "en_synonymous";

/// Fraction of ON bits in a placeholder fingerprint.
pub const TARGET_SPARSITY: f64 = 0.03;

/// Grid dimensions of a named semantic model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetinaProfile {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

const PROFILES: &[RetinaProfile] = &[
    RetinaProfile {
        name: "en_synonymous",
        width: 128,
        height: 128,
    },
    RetinaProfile {
        name: "en_associative",
        width: 128,
        height: 128,
    },
];

impl RetinaProfile {
    /// Looks up a retina by name.
    pub fn lookup(name: &str) -> Option<RetinaProfile> {
        PROFILES.iter().copied().find(|profile| profile.name == name)
    }

    /// All known retinas.
    pub fn all() -> &'static [RetinaProfile] {
        PROFILES
    }

    /// Number of cells on the grid.
    #[inline]
    pub fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
