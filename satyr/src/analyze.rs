//! Conflict analysis.
//!
//! A conflict at a positive decision level is resolved into a learned clause
//! containing exactly one literal of the conflicting level, the first unique
//! implication point. Starting from the conflicting clause, literals of the
//! current level are counted and everything else goes into the clause buffer;
//! walking the trail backwards, the antecedent of each counted literal is
//! resolved in until a single counted literal remains. Its negation is the
//! UIP and goes last into the buffer.
//!
//! The learned clause is then shrunk by self subsumption: a non-UIP literal
//! whose antecedent consists only of literals already implied by the marked
//! ones is redundant and dropped.
use partial_ref::{partial, PartialRef};

use crate::clauses::ClauseRef;
use crate::context::{
    ActivityQueueP, AnalyzeConflictP, AssignmentP, ClauseStoreP, Context, ImplGraphP,
    SolverConfigP, TrailP,
};
use crate::lit::{Lit, Var};
use crate::marker::EpochMarker;
use crate::trail::Reason;

/// Marker value for variables known not to be implied by the UIP side.
const NOT_FROM_UIP: i32 = 2;

/// Temporaries for conflict analysis.
#[derive(Default)]
pub struct AnalyzeConflict {
    /// The learned clause; the UIP literal is last.
    learnt: Vec<Lit>,
    /// Polarity marks per variable, also caching `from_uip` results.
    lit_marker: EpochMarker,
    /// Positions of removable learned clause literals.
    del_marker: EpochMarker,
}

impl AnalyzeConflict {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.lit_marker.set_len(count);
        self.del_marker.set_len(count);
    }

    /// The learned clause of the last analysis.
    pub fn clause(&self) -> &[Lit] {
        &self.learnt
    }
}

/// Derive the first UIP clause from a conflict.
///
/// Bumps the activity of every variable taking part in the resolution and
/// decays all activities first when VSIDS is enabled. Returns `false` when
/// resolution meets a variable in both polarities, which indicates malformed
/// input and makes the formula unsatisfiable.
pub fn analyze_conflict(
    mut ctx: partial!(
        Context,
        mut ActivityQueueP,
        mut AnalyzeConflictP,
        AssignmentP,
        ClauseStoreP,
        ImplGraphP,
        SolverConfigP,
        TrailP,
    ),
    conflict: ClauseRef,
) -> bool {
    debug_assert!(ctx.part(TrailP).current_level() > 0);

    if ctx.part(SolverConfigP).heuristic.vsids() {
        ctx.part_mut(ActivityQueueP).decay_all();
    }

    {
        let analyze = ctx.part_mut(AnalyzeConflictP);
        analyze.lit_marker.clear();
        analyze.learnt.clear();
    }

    let mut todo = match resolve(ctx.borrow(), conflict, None) {
        Some(count) => count,
        None => return false,
    };

    // All assignments above the current level's decision are of the current
    // level, so walking down from the top only meets marked variables of this
    // level while any are outstanding.
    let mut top = ctx.part(TrailP).len();

    while todo > 1 {
        let var = next_marked(ctx.borrow(), &mut top);
        let cref = match ctx.part(ImplGraphP).reason(var) {
            Reason::Clause(cref) => cref,
            // only the level's decision has no antecedent and it is reached
            // last
            Reason::None => unreachable!(),
        };
        match resolve(ctx.borrow(), cref, Some(var)) {
            Some(count) => todo = todo + count - 1,
            None => return false,
        }
    }

    let uip_var = next_marked(ctx.borrow(), &mut top);
    let uip = match ctx.part(AssignmentP).var_value(uip_var) {
        Some(true) => uip_var.negative(),
        _ => uip_var.positive(),
    };
    ctx.part_mut(AnalyzeConflictP).learnt.push(uip);

    minimize(ctx.borrow());

    true
}

/// The most recent trail variable below `top` that is marked.
fn next_marked(
    mut ctx: partial!(Context, AnalyzeConflictP, TrailP),
    top: &mut usize,
) -> Var {
    let (analyze, mut ctx) = ctx.split_part(AnalyzeConflictP);
    let trail = ctx.part(TrailP).trail();
    loop {
        *top -= 1;
        let var = trail[*top].var();
        if analyze.lit_marker.get(var.index()) != -1 {
            return var;
        }
    }
}

/// Resolve a clause into the nascent learned clause.
///
/// Every newly marked variable is bumped; literals of the current level are
/// counted, all others are appended to the clause buffer. Returns the count
/// of fresh current level literals, or `None` when a variable occurs in both
/// polarities.
fn resolve(
    mut ctx: partial!(
        Context,
        mut ActivityQueueP,
        mut AnalyzeConflictP,
        ClauseStoreP,
        ImplGraphP,
        SolverConfigP,
        TrailP,
    ),
    cref: ClauseRef,
    exclude: Option<Var>,
) -> Option<usize> {
    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let (store, mut ctx) = ctx.split_part(ClauseStoreP);

    let level = ctx.part(TrailP).current_level();
    let bump = ctx.part(SolverConfigP).bump();

    let mut count = 0;
    for &lit in store.lits(cref) {
        let var = lit.var();
        if Some(var) == exclude {
            continue;
        }
        let polarity = lit.is_positive() as i32;
        match analyze.lit_marker.get(var.index()) {
            -1 => (),
            mark if mark == polarity => continue,
            _ => return None,
        }
        analyze.lit_marker.set(var.index(), polarity);
        ctx.part_mut(ActivityQueueP)
            .increase(var, bump, lit.is_positive());
        if ctx.part(ImplGraphP).level(var) == level {
            count += 1;
        } else {
            analyze.learnt.push(lit);
        }
    }
    Some(count)
}

/// Self subsumption minimization of the learned clause.
///
/// Re-marks the clause literals, then drops every non-UIP literal whose
/// antecedent is entirely implied by marked literals. The relative order of
/// the surviving literals is kept, the UIP stays last.
fn minimize(
    mut ctx: partial!(Context, mut AnalyzeConflictP, ClauseStoreP, ImplGraphP),
) {
    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);

    analyze.lit_marker.clear();
    analyze.del_marker.clear();

    for &lit in analyze.learnt.iter() {
        analyze
            .lit_marker
            .set(lit.index(), lit.is_positive() as i32);
    }

    let mut removed = false;
    for position in (0..analyze.learnt.len().saturating_sub(1)).rev() {
        let var = analyze.learnt[position].var();
        let cref = match ctx.part(ImplGraphP).reason(var) {
            Reason::Clause(cref) => cref,
            Reason::None => continue,
        };

        let mut removable = true;
        for index in 0..ctx.part(ClauseStoreP).clause_len(cref) {
            let other = ctx.part(ClauseStoreP).lits(cref)[index];
            if other.var() != var
                && !from_uip(
                    ctx.borrow(),
                    &mut analyze.lit_marker,
                    other.var(),
                    other.is_positive(),
                )
            {
                removable = false;
                break;
            }
        }

        if removable {
            removed = true;
            analyze.del_marker.set(position, 1);
        }
    }

    if removed {
        let AnalyzeConflict {
            learnt, del_marker, ..
        } = analyze;
        let mut position = 0;
        learnt.retain(|_| {
            let keep = del_marker.get(position) == -1;
            position += 1;
            keep
        });
    }
}

/// Whether an assignment is implied by the marked literals.
///
/// Walks antecedents recursively; assignments without an antecedent that are
/// not marked themselves end the search negatively. Results are cached in the
/// marker, using the polarity values for hits and a sentinel for misses.
fn from_uip(
    mut ctx: partial!(Context, ClauseStoreP, ImplGraphP),
    marker: &mut EpochMarker,
    var: Var,
    polarity: bool,
) -> bool {
    let mark = marker.get(var.index());
    if mark != -1 {
        return mark == polarity as i32;
    }

    let cref = match ctx.part(ImplGraphP).reason(var) {
        Reason::Clause(cref) => cref,
        Reason::None => {
            marker.set(var.index(), NOT_FROM_UIP);
            return false;
        }
    };

    for index in 0..ctx.part(ClauseStoreP).clause_len(cref) {
        let lit = ctx.part(ClauseStoreP).lits(cref)[index];
        if lit.var() != var && !from_uip(ctx.borrow(), marker, lit.var(), lit.is_positive()) {
            marker.set(var.index(), NOT_FROM_UIP);
            return false;
        }
    }

    marker.set(var.index(), polarity as i32);
    true
}
