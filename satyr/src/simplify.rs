//! Simplification under the top level assignment.
use partial_ref::{partial, PartialRef};

use crate::clauses::ClauseStore;
use crate::context::{AssignmentP, ClauseStoreP, Context, TmpDataP, WatchersP};

/// Remove satisfied clauses and false literals, then rebuild all watches.
///
/// Runs at level zero once unit propagation reached a fixpoint and before any
/// clause is learned, so no trail entry or learned clause can hold a stale
/// clause reference.
pub fn simplify(
    mut ctx: partial!(
        Context,
        mut ClauseStoreP,
        mut TmpDataP,
        mut WatchersP,
        AssignmentP,
    ),
) {
    let (store, mut ctx) = ctx.split_part_mut(ClauseStoreP);
    let (tmp, mut ctx) = ctx.split_part_mut(TmpDataP);
    let (assignment, mut ctx) = ctx.split_part(AssignmentP);

    let mut simplified = ClauseStore::default();

    for cref in store.refs() {
        tmp.lits.clear();
        let mut satisfied = false;
        for &lit in store.lits(cref) {
            match assignment.lit_value(lit) {
                Some(true) => {
                    satisfied = true;
                    break;
                }
                Some(false) => (),
                None => tmp.lits.push(lit),
            }
        }
        if !satisfied {
            // After full propagation a clause cannot lose all or all but one
            // literal without being satisfied or conflicting.
            debug_assert!(tmp.lits.len() >= 2);
            simplified.push(&tmp.lits);
        }
    }

    *store = simplified;

    let watchers = ctx.part_mut(WatchersP);
    watchers.reset();
    for cref in store.refs() {
        watchers.watch_clause(
            cref,
            [store.watched_lit(cref, 0), store.watched_lit(cref, 1)],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use satyr_formula::{cnf_formula, lit};

    use crate::context::{set_var_count, ClauseStoreP, SolverStateP, TrailP};
    use crate::load::load_clause;
    use crate::prop::propagate;
    use crate::state::SatState;

    #[test]
    fn drops_satisfied_and_strips_false() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let formula = cnf_formula![
            1;
            1, 2, 3;
            -1, 2, 3;
            -2, -3, -1;
        ];

        set_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }

        propagate(ctx.borrow()).unwrap();
        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

        simplify(ctx.borrow());

        // the unit killed the satisfied clause and shortened the others
        let store = ctx.part(ClauseStoreP);
        assert_eq!(store.len(), 2);
        for cref in store.refs() {
            assert_eq!(store.clause_len(cref), 2);
            for &lit in store.lits(cref) {
                assert_ne!(lit.var(), lit!(1).var());
            }
        }

        assert_eq!(ctx.part(TrailP).trail().len(), 1);
    }
}
