//! The conflict driven clause learning search.
use std::sync::atomic::Ordering;

use partial_ref::{partial, PartialRef};

use crate::analyze::analyze_conflict;
use crate::clauses::ClauseRef;
use crate::context::{
    ActivityQueueP, AnalyzeConflictP, AssignmentP, ClauseStoreP, Context, ImplGraphP,
    SolverConfigP, SolverStateP, TmpDataP, TrailP, WatchersP,
};
use crate::decision::{init_heuristic, make_decision};
use crate::lit::Lit;
use crate::prop::{assign_and_propagate, propagate, Conflict};
use crate::simplify::simplify;
use crate::state::SatState;
use crate::trail::{backtrack, Reason};

/// Outcome of handling one conflict.
enum Learning {
    /// The conflict has no resolution; the formula is unsatisfiable.
    Unsat,
    /// The learned clause collapsed to a top level unit which is already
    /// asserted and propagated.
    Assignment,
    /// A clause was learned and the search backjumped; assert the UIP with
    /// the new clause as its antecedent.
    Clause { uip: Lit, cref: ClauseRef },
    /// The abort flag was raised while asserting a learned unit.
    Interrupted,
}

/// Preprocess the loaded formula and run the search.
pub fn solve(
    mut ctx: partial!(
        Context,
        mut ActivityQueueP,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseStoreP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut WatchersP,
        SolverConfigP,
    ),
) -> SatState {
    let decay = ctx.part(SolverConfigP).vsids_decay;
    ctx.part_mut(ActivityQueueP).set_decay(decay);

    // propagate the input units at the top level
    match propagate(ctx.borrow()) {
        Ok(()) => (),
        Err(Conflict::Interrupted) => return SatState::Interrupted,
        Err(_) => return SatState::Unsat,
    }

    simplify(ctx.borrow());
    init_heuristic(ctx.borrow());

    search(ctx.borrow())
}

/// Alternate decisions, propagation and clause learning until the formula is
/// decided or time runs out.
fn search(
    mut ctx: partial!(
        Context,
        mut ActivityQueueP,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseStoreP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut WatchersP,
        SolverConfigP,
    ),
) -> SatState {
    loop {
        // the wall clock and the abort flag are checked between decisions
        if let Some(timeout) = ctx.part(SolverConfigP).timeout {
            let started = ctx.part(SolverStateP).started;
            if started.map_or(false, |started| started.elapsed() > timeout) {
                return SatState::Timeout;
            }
        }
        if ctx.part(SolverStateP).abort.load(Ordering::Relaxed) {
            return SatState::Interrupted;
        }

        if !make_decision(ctx.borrow()) {
            return SatState::Sat;
        }
        ctx.part_mut(SolverStateP).stats.decisions += 1;

        let mut result = propagate(ctx.borrow());
        loop {
            let conflict = match result {
                Ok(()) => break,
                Err(Conflict::Interrupted) => return SatState::Interrupted,
                Err(Conflict::Assignment) => return SatState::Unsat,
                Err(Conflict::Clause(cref)) => cref,
            };
            ctx.part_mut(SolverStateP).stats.conflicts += 1;

            match learn_from_conflict(ctx.borrow(), conflict) {
                Learning::Unsat => return SatState::Unsat,
                Learning::Interrupted => return SatState::Interrupted,
                Learning::Assignment => break,
                Learning::Clause { uip, cref } => {
                    result = assign_and_propagate(ctx.borrow(), uip, Reason::Clause(cref));
                }
            }
        }
    }
}

/// Learn from a conflicting clause and backjump.
///
/// The learned clause is asserting: all its literals except the UIP are
/// falsified at or below the backjump level, so after backjumping the UIP
/// propagates with the learned clause as its antecedent. When the clause is a
/// single literal, or every other literal is falsified at the top level, the
/// UIP becomes a permanent top level assignment instead.
fn learn_from_conflict(
    mut ctx: partial!(
        Context,
        mut ActivityQueueP,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseStoreP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut WatchersP,
        SolverConfigP,
    ),
    conflict: ClauseRef,
) -> Learning {
    if ctx.part(TrailP).current_level() == 0 {
        return Learning::Unsat;
    }

    if !analyze_conflict(ctx.borrow(), conflict) {
        return Learning::Unsat;
    }

    // the backjump level is the highest level among the non-UIP literals; the
    // literal carrying it becomes the second watch
    let (backlv, towatch) = {
        let mut ctx: partial!(Context, AnalyzeConflictP, ImplGraphP) = ctx.borrow();
        let (analyze, mut ctx) = ctx.split_part(AnalyzeConflictP);
        let graph = ctx.part(ImplGraphP);
        let learnt = analyze.clause();

        let mut backlv = 0;
        let mut towatch = 0;
        for position in (0..learnt.len().saturating_sub(1)).rev() {
            let level = graph.level(learnt[position].var());
            if level > backlv {
                backlv = level;
                towatch = position;
            }
        }
        (backlv, towatch)
    };

    let learnt_len = ctx.part(AnalyzeConflictP).clause().len();

    if learnt_len == 1 || backlv == 0 {
        backtrack(ctx.borrow(), 0);
        let uip = ctx.part(AnalyzeConflictP).clause()[learnt_len - 1];
        ctx.part_mut(SolverStateP).stats.learned_units += 1;
        match assign_and_propagate(ctx.borrow(), uip, Reason::None) {
            Ok(()) => Learning::Assignment,
            Err(Conflict::Interrupted) => Learning::Interrupted,
            Err(_) => Learning::Unsat,
        }
    } else {
        let cref = {
            let mut ctx: partial!(
                Context,
                AnalyzeConflictP,
                ImplGraphP,
                mut ClauseStoreP,
                mut WatchersP,
            ) = ctx.borrow();
            let (analyze, mut ctx) = ctx.split_part(AnalyzeConflictP);
            let learnt = analyze.clause();
            debug_assert!(learnt
                .iter()
                .take(learnt.len() - 1)
                .all(|lit| ctx.part(ImplGraphP).level(lit.var()) <= backlv));

            let cref = ctx
                .part_mut(ClauseStoreP)
                .push_watched(learnt, [towatch, learnt.len() - 1]);
            ctx.part_mut(WatchersP)
                .watch_clause(cref, [learnt[towatch], learnt[learnt.len() - 1]]);
            cref
        };
        ctx.part_mut(SolverStateP).stats.learned_clauses += 1;

        let uip = ctx.part(AnalyzeConflictP).clause()[learnt_len - 1];
        backtrack(ctx.borrow(), backlv);
        debug_assert!(ctx.part(AssignmentP).lit_is_unk(uip));

        Learning::Clause { uip, cref }
    }
}
