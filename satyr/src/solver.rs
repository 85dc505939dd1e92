//! Boolean satisfiability solver.
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Error;
use log::info;
use partial_ref::{IntoPartialRefMut, PartialRef};

use crate::cdcl;
use crate::cnf::CnfFormula;
use crate::config::HeuristicMode;
use crate::context::{ensure_var_count, Context, SolverStateP};
use crate::dimacs::DimacsParser;
use crate::lit::Lit;
use crate::load::load_clause;
use crate::state::SatState;

/// A CDCL based boolean satisfiability solver.
///
/// Learned clauses are kept for the whole solve, so memory grows
/// monotonically until the solver is dropped. There is no restart or clause
/// deletion policy.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Create a solver from a DIMACS CNF file and a heuristic mode bitmask.
    ///
    /// The bitmask combines the flags in [`config`](crate::config); bits
    /// outside of them are reserved and ignored.
    pub fn init(path: impl AsRef<Path>, mode: u32) -> Result<Solver, Error> {
        let mut solver = Solver::new();
        solver.set_mode(mode);
        solver.add_dimacs_cnf(fs::File::open(path)?)?;
        Ok(solver)
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Read and add a formula in DIMACS CNF format.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let formula = DimacsParser::parse(input)?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            formula.var_count(),
            formula.len()
        );

        self.add_formula(&formula);

        Ok(())
    }

    /// Select the heuristic mode bitmask.
    pub fn set_mode(&mut self, mode: u32) {
        self.ctx.solver_config.heuristic = HeuristicMode::from_bits(mode);
    }

    /// Limit the wall clock time of `solve`.
    ///
    /// The limit is checked between decisions; on expiry `solve` gives up and
    /// `result` reports a timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.ctx.solver_config.timeout = Some(timeout);
    }

    /// A flag that interrupts the solver when set from another thread.
    ///
    /// The flag is polled during propagation; an interrupted solve reports a
    /// timeout-like result.
    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        self.ctx.solver_state.abort.clone()
    }

    /// Check the satisfiability of the formula.
    ///
    /// Returns `true` exactly when a satisfying assignment was found; an
    /// unsatisfiable formula, a timeout and an interrupt all return `false`
    /// and can be told apart via [`sat_state`](Solver::sat_state) or
    /// [`result`](Solver::result).
    pub fn solve(&mut self) -> bool {
        let mut ctx = self.ctx.into_partial_ref_mut();

        if ctx.part(SolverStateP).sat_state == SatState::Unknown {
            ctx.part_mut(SolverStateP).started = Some(Instant::now());

            let state = cdcl::solve(ctx.borrow());
            ctx.part_mut(SolverStateP).sat_state = state;

            let stats = &ctx.part(SolverStateP).stats;
            info!(
                "Finished with {:?}: {} decisions, {} conflicts, {} propagations, {} learned clauses, {} learned units",
                state,
                stats.decisions,
                stats.conflicts,
                stats.propagations,
                stats.learned_clauses,
                stats.learned_units
            );
        }

        ctx.part(SolverStateP).sat_state == SatState::Sat
    }

    /// The state the last `solve` ended in.
    pub fn sat_state(&self) -> SatState {
        self.ctx.solver_state.sat_state
    }

    /// The result vector in the signed DIMACS encoding.
    ///
    /// On SAT, index 0 holds a sentinel and index v the signed literal
    /// satisfied by variable v's assignment. On UNSAT the vector is `[0]`; on
    /// timeout or interrupt, and before `solve` was called, it is `[-1]`.
    pub fn result(&self) -> Vec<isize> {
        match self.ctx.solver_state.sat_state {
            SatState::Sat => {
                let values = self.ctx.assignment.values();
                let mut result = Vec::with_capacity(values.len() + 1);
                result.push(1);
                for (index, value) in values.iter().enumerate() {
                    let number = (index + 1) as isize;
                    result.push(if value.unwrap_or(false) { number } else { -number });
                }
                result
            }
            SatState::Unsat => vec![0],
            _ => vec![-1],
        }
    }

    /// Set of literals that satisfy the formula.
    pub fn model(&self) -> Option<Vec<Lit>> {
        if self.ctx.solver_state.sat_state != SatState::Sat {
            return None;
        }
        Some(
            self.ctx
                .assignment
                .values()
                .iter()
                .enumerate()
                .flat_map(|(index, value)| value.map(|value| Lit::from_index(index, value)))
                .collect(),
        )
    }

    /// Number of variables of the formula.
    pub fn var_count(&self) -> usize {
        self.ctx.assignment.values().len()
    }

    /// Number of clauses in the store, including learned ones.
    pub fn clause_count(&self) -> usize {
        self.ctx.clause_store.len()
    }
}
