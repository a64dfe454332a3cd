//! Environment configuration consulted by the action-space factory and
//! legality checks.

/// Per-environment policy toggles for the action subsystem.
///
/// Passed explicitly wherever it is consulted — never read from ambient or
/// global state — so validation stays referentially transparent. The
/// defaults match the conservative environment: detachment disabled, two
/// busbars per substation.
///
/// The per-kind toggles only matter when `allow_detachment` is `true`; they
/// let an environment permit shedding loads while, say, keeping storage
/// units firm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridConfig {
    /// Master switch for the detachment (shedding) API.
    pub allow_detachment: bool,
    /// Whether loads may be detached.
    pub detach_load_allowed: bool,
    /// Whether generators may be detached.
    pub detach_gen_allowed: bool,
    /// Whether storage units may be detached.
    pub detach_storage_allowed: bool,
    /// Number of busbars available at each substation.
    pub n_busbar_per_sub: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            allow_detachment: false,
            detach_load_allowed: true,
            detach_gen_allowed: true,
            detach_storage_allowed: true,
            n_busbar_per_sub: 2,
        }
    }
}

impl GridConfig {
    /// A configuration with detachment fully enabled.
    pub fn with_detachment() -> Self {
        Self {
            allow_detachment: true,
            ..Self::default()
        }
    }
}
