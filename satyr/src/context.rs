//! Central solver data structure.
//!
//! This module defines the `Context` data structure which holds all data used
//! by the solver. It also contains global notification functions that likely
//! need to be extended when new parts are added to the solver.
use partial_ref::{part, partial, PartialRef, PartialRefTarget};

use crate::analyze::AnalyzeConflict;
use crate::clauses::ClauseStore;
use crate::config::SolverConfig;
use crate::decision::queue::ActivityQueue;
use crate::state::SolverState;
use crate::tmp::TmpData;
use crate::trail::{Assignment, ImplGraph, Trail};
use crate::watch::Watchers;

/// Part declarations for the [`Context`] struct.
pub mod parts {
    use super::*;

    part!(pub ActivityQueueP: ActivityQueue);
    part!(pub AnalyzeConflictP: AnalyzeConflict);
    part!(pub AssignmentP: Assignment);
    part!(pub ClauseStoreP: ClauseStore);
    part!(pub ImplGraphP: ImplGraph);
    part!(pub SolverConfigP: SolverConfig);
    part!(pub SolverStateP: SolverState);
    part!(pub TmpDataP: TmpData);
    part!(pub TrailP: Trail);
    part!(pub WatchersP: Watchers);
}

pub use parts::*;

/// Central solver data structure.
///
/// This struct contains all data kept by the solver. Most functions operating
/// on multiple fields of the context use partial references provided by the
/// `partial_ref` crate. This documents the data dependencies and makes the
/// borrow checker happy without the overhead of passing individual references.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part(ActivityQueueP)]
    pub activity_queue: ActivityQueue,
    #[part(AnalyzeConflictP)]
    pub analyze_conflict: AnalyzeConflict,
    #[part(AssignmentP)]
    pub assignment: Assignment,
    #[part(ClauseStoreP)]
    pub clause_store: ClauseStore,
    #[part(ImplGraphP)]
    pub impl_graph: ImplGraph,
    #[part(SolverConfigP)]
    pub solver_config: SolverConfig,
    #[part(SolverStateP)]
    pub solver_state: SolverState,
    #[part(TmpDataP)]
    pub tmp_data: TmpData,
    #[part(TrailP)]
    pub trail: Trail,
    #[part(WatchersP)]
    pub watchers: Watchers,
}

/// Update structures for a new variable count.
pub fn set_var_count(
    mut ctx: partial!(
        Context,
        mut ActivityQueueP,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ImplGraphP,
        mut WatchersP,
    ),
    count: usize,
) {
    ctx.part_mut(ActivityQueueP).set_var_count(count);
    ctx.part_mut(AnalyzeConflictP).set_var_count(count);
    ctx.part_mut(AssignmentP).set_var_count(count);
    ctx.part_mut(ImplGraphP).set_var_count(count);
    ctx.part_mut(WatchersP).set_var_count(count);
}

/// Increase the variable count to at least the given value.
pub fn ensure_var_count(
    mut ctx: partial!(
        Context,
        mut ActivityQueueP,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ImplGraphP,
        mut WatchersP,
    ),
    count: usize,
) {
    if count > ctx.part(AssignmentP).values().len() {
        set_var_count(ctx.borrow(), count)
    }
}
