//! Unit propagation with two watched literals.
//!
//! Assigning a literal falsifies its negation, so only the watcher list of the
//! negation has to be scanned. For every watcher there, the watch slot rotates
//! through the clause looking for another literal that is unassigned or true.
//! If one exists the watcher moves to that literal's list. If not, the clause
//! is determined by its other watcher: unassigned means the clause became unit
//! and the other watcher is asserted, false means the clause is empty under
//! the assignment and propagation stops with it as the conflict, true means
//! the clause is satisfied and the watcher stays put.
//!
//! Instead of recursing into freshly implied assignments, implications are
//! appended to the trail and worked off in assignment order. Watchers are
//! visited in list order; the successor is captured before a watcher is
//! spliced away, and reaching the list head again ends the pass.
use std::sync::atomic::Ordering;

use partial_ref::{partial, PartialRef};

use crate::clauses::ClauseRef;
use crate::context::{
    AssignmentP, ClauseStoreP, Context, ImplGraphP, SolverStateP, TrailP, WatchersP,
};
use crate::lit::Lit;
use crate::trail::{enqueue_assignment, Reason};
use crate::watch::NIL;

/// Propagation that ran into a contradiction.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Conflict {
    /// A literal was asserted whose negation already holds; there is no
    /// clause to blame.
    Assignment,
    /// Every literal of this clause is false.
    Clause(ClauseRef),
    /// The abort flag was raised.
    Interrupted,
}

/// Assert a literal and propagate to a fixpoint.
///
/// Asserting an already true literal succeeds without doing anything, an
/// already false one fails without a conflict clause.
pub fn assign_and_propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseStoreP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut WatchersP,
    ),
    lit: Lit,
    reason: Reason,
) -> Result<(), Conflict> {
    match ctx.part(AssignmentP).lit_value(lit) {
        Some(true) => Ok(()),
        Some(false) => Err(Conflict::Assignment),
        None => {
            enqueue_assignment(ctx.borrow(), lit, reason);
            propagate(ctx.borrow())
        }
    }
}

/// Work off all enqueued assignments in trail order.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseStoreP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        mut WatchersP,
    ),
) -> Result<(), Conflict> {
    while let Some(lit) = ctx.part_mut(TrailP).pop_queue() {
        if ctx.part(SolverStateP).abort.load(Ordering::Relaxed) {
            return Err(Conflict::Interrupted);
        }
        ctx.part_mut(SolverStateP).stats.propagations += 1;
        propagate_assignment(ctx.borrow(), lit)?;
    }
    Ok(())
}

/// Scan the watchers of the literal falsified by the given assignment.
fn propagate_assignment(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseStoreP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchersP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    let falsified = !lit;

    let mut id = ctx.part(WatchersP).head(falsified);
    while id != NIL {
        // capture the successor before any splice; wrapping around to the
        // current head ends the pass
        let next = {
            let watchers = ctx.part(WatchersP);
            let next = watchers.next_of(id);
            if next == watchers.head(falsified) {
                NIL
            } else {
                next
            }
        };

        let (cref, slot) = ctx.part(WatchersP).watcher(id);

        let new_lit = advance_watch(ctx.borrow(), cref, slot);

        if !ctx.part(AssignmentP).lit_is_false(new_lit) {
            // found another literal to watch
            ctx.part_mut(WatchersP).splice(falsified, new_lit, id);
        } else {
            let other = ctx.part(ClauseStoreP).watched_lit(cref, slot ^ 1);
            match ctx.part(AssignmentP).lit_value(other) {
                // the clause became unit
                None => enqueue_assignment(ctx.borrow(), other, Reason::Clause(cref)),
                Some(false) => return Err(Conflict::Clause(cref)),
                // the clause is satisfied, the watcher stays where it is
                Some(true) => (),
            }
        }

        id = next;
    }

    Ok(())
}

/// Rotate a watch slot to the next usable literal of its clause.
///
/// Steps through the clause at most `size` times, accepting the first
/// position that is not held by the other watcher and carries an unassigned
/// or true literal. When nothing is usable the slot ends up back on its
/// falsified literal.
fn advance_watch(
    mut ctx: partial!(Context, mut ClauseStoreP, AssignmentP),
    cref: ClauseRef,
    slot: usize,
) -> Lit {
    let (store, mut ctx) = ctx.split_part_mut(ClauseStoreP);
    let assignment = ctx.part(AssignmentP);

    for _ in 0..store.clause_len(cref) {
        store.rotate_watch(cref, slot);
        if store.watch_pos(cref, slot) != store.watch_pos(cref, slot ^ 1) {
            let lit = store.watched_lit(cref, slot);
            if !assignment.lit_is_false(lit) {
                return lit;
            }
        }
    }

    store.watched_lit(cref, slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use satyr_formula::{cnf_formula, lit, lits, CnfFormula};

    use crate::context::{set_var_count, ActivityQueueP, AnalyzeConflictP, TmpDataP};
    use crate::load::load_clause;
    use crate::trail::backtrack;

    fn load(
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
        ),
        formula: &CnfFormula,
    ) {
        set_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Every watcher must be in the list of the literal it watches.
    fn check_watch_lists(ctx: &Context) {
        let store = &ctx.clause_store;
        let watchers = &ctx.watchers;

        for cref in store.refs() {
            assert_ne!(store.watch_pos(cref, 0), store.watch_pos(cref, 1));
            for slot in 0..2 {
                let id = (cref.index() * 2 + slot) as u32;
                let lit = store.watched_lit(cref, slot);

                let head = watchers.head(lit);
                assert_ne!(head, NIL);
                let mut found = false;
                let mut walk = head;
                loop {
                    if walk == id {
                        found = true;
                    }
                    walk = watchers.next_of(walk);
                    if walk == head {
                        break;
                    }
                }
                assert!(found, "watcher {} not in the list of {:?}", id, lit);
            }
        }
    }

    #[test]
    fn propagates_unit_chain() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        load(
            ctx.borrow(),
            &cnf_formula![
                -1, 2;
                -2, 3;
                -3, 4;
            ],
        );

        ctx.part_mut(TrailP).set_level(1);
        assign_and_propagate(ctx.borrow(), lit!(1), Reason::None).unwrap();

        for &lit in lits![1, 2, 3, 4].iter() {
            assert!(ctx.part(AssignmentP).lit_is_true(lit));
        }
        assert!(ctx.part(TrailP).fully_propagated());
    }

    #[test]
    fn reports_the_conflicting_clause() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        load(
            ctx.borrow(),
            &cnf_formula![
                -1, 2;
                -1, -2;
            ],
        );

        ctx.part_mut(TrailP).set_level(1);
        let result = assign_and_propagate(ctx.borrow(), lit!(1), Reason::None);

        match result {
            Err(Conflict::Clause(cref)) => {
                // both literals of the reported clause are false
                for &lit in ctx.part(ClauseStoreP).lits(cref) {
                    assert!(ctx.part(AssignmentP).lit_is_false(lit));
                }
            }
            other => panic!("expected a clause conflict, got {:?}", other),
        }
    }

    #[test]
    fn conflicting_reassignment_has_no_clause() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        load(ctx.borrow(), &cnf_formula![1, 2;]);

        ctx.part_mut(TrailP).set_level(1);
        assign_and_propagate(ctx.borrow(), lit!(1), Reason::None).unwrap();
        assert_eq!(
            assign_and_propagate(ctx.borrow(), lit!(1), Reason::None),
            Ok(())
        );
        assert_eq!(
            assign_and_propagate(ctx.borrow(), lit!(-1), Reason::None),
            Err(Conflict::Assignment)
        );
    }

    #[test]
    fn watch_lists_stay_consistent() {
        let mut context = Context::default();

        {
            let mut ctx = context.into_partial_ref_mut();
            load(
                ctx.borrow(),
                &cnf_formula![
                    1, 2, 3;
                    -1, 2, 4;
                    -2, -3, -4;
                    1, -3, 4;
                    -1, -2, 3;
                ],
            );

            for &(level, lit) in [(1usize, lit!(-1)), (2, lit!(-2)), (3, lit!(4))].iter() {
                ctx.part_mut(TrailP).set_level(level);
                assign_and_propagate(ctx.borrow(), lit, Reason::None).unwrap();
            }
        }
        check_watch_lists(&context);

        {
            let mut ctx = context.into_partial_ref_mut();
            backtrack(ctx.borrow(), 1);
        }
        check_watch_lists(&context);

        {
            let mut ctx = context.into_partial_ref_mut();
            ctx.part_mut(TrailP).set_level(2);
            assign_and_propagate(ctx.borrow(), lit!(3), Reason::None).unwrap();
        }
        check_watch_lists(&context);
    }
}
