//! Solver configuration.
use std::time::Duration;

/// Heuristic mode flag: decay variable activities on every conflict.
pub const VSIDS: u32 = 4;
/// Heuristic mode flag: seed activities by occurrence counts in short clauses.
pub const MOM: u32 = 8;
/// Heuristic mode flag: seed activities with Jeroslow-Wang scores.
pub const JW: u32 = 16;

/// Branching heuristic selection parsed from a mode bitmask.
///
/// Any combination of the `VSIDS`, `MOM` and `JW` flags is accepted; other
/// bits are reserved and ignored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HeuristicMode {
    bits: u32,
}

impl HeuristicMode {
    /// Parse a mode bitmask.
    pub fn from_bits(bits: u32) -> HeuristicMode {
        HeuristicMode { bits }
    }

    /// The raw bitmask.
    pub fn bits(self) -> u32 {
        self.bits
    }

    /// Whether activities decay on every conflict.
    pub fn vsids(self) -> bool {
        self.bits & VSIDS != 0
    }

    /// Whether initial activities come from the MOM seeding pass.
    pub fn mom(self) -> bool {
        self.bits & MOM != 0
    }

    /// Whether initial activities come from the Jeroslow-Wang seeding pass.
    pub fn jw(self) -> bool {
        self.bits & JW != 0
    }
}

/// Configurable parameters used during solving.
pub struct SolverConfig {
    /// Heuristic mode flags. (Default: `VSIDS`)
    pub heuristic: HeuristicMode,

    /// Multiplicative decay for variable activities; the activity bump per
    /// conflict is one minus this. (Default: 0.9)
    pub vsids_decay: f64,

    /// Largest clause size counted by the MOM seeding pass. (Default: 10)
    pub mom_size_limit: usize,

    /// Wall clock limit for a single solve. (Default: none)
    pub timeout: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            heuristic: HeuristicMode::from_bits(VSIDS),
            vsids_decay: 0.9,
            mom_size_limit: 10,
            timeout: None,
        }
    }
}

impl SolverConfig {
    /// The activity increment used when a variable takes part in a conflict.
    pub fn bump(&self) -> f64 {
        1.0 - self.vsids_decay
    }
}
