//! Miscellaneous solver state.
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

/// Satisfiability state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    Unknown,
    Sat,
    Unsat,
    Timeout,
    Interrupted,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}

/// Counters updated during the search.
#[derive(Default)]
pub struct SearchStats {
    pub decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
    pub learned_clauses: u64,
    pub learned_units: u64,
}

/// Miscellaneous solver state.
///
/// Anything larger or any group of related state variables should become a
/// separate part of [`Context`](crate::context::Context).
#[derive(Default)]
pub struct SolverState {
    pub sat_state: SatState,
    /// Raised from another thread to make the solver give up.
    pub abort: Arc<AtomicBool>,
    /// Start of the current solve, for the wall clock check.
    pub started: Option<Instant>,
    pub stats: SearchStats,
}
