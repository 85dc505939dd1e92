//! Loading a formula into the solver.
use partial_ref::{partial, PartialRef};

use crate::context::{
    AssignmentP, ClauseStoreP, Context, ImplGraphP, SolverStateP, TmpDataP, TrailP, WatchersP,
};
use crate::lit::Lit;
use crate::state::SatState;
use crate::trail::{enqueue_assignment, Reason};

/// Add a clause of the input formula.
///
/// Removes duplicated literals, ignores tautological clauses (eg. x v -x v
/// y), records empty clauses as unsatisfiable and enqueues units at the top
/// level. Everything else goes into the clause store and gets watched.
///
/// Must be called before solving starts. Does not adjust the solver's
/// variable count; if necessary that has to be done before calling this.
pub fn load_clause(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseStoreP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut WatchersP,
    ),
    lits: &[Lit],
) {
    if ctx.part(SolverStateP).sat_state == SatState::Unsat {
        return;
    }

    let (tmp, mut ctx) = ctx.split_part_mut(TmpDataP);

    tmp.lits.clear();
    tmp.lits.extend_from_slice(lits);
    tmp.lits.sort_unstable();
    tmp.lits.dedup();

    // Sorting makes complementary literals adjacent
    let mut last = None;
    for &lit in tmp.lits.iter() {
        if last == Some(!lit) {
            return;
        }
        last = Some(lit);
    }

    match tmp.lits[..] {
        [] => ctx.part_mut(SolverStateP).sat_state = SatState::Unsat,
        [lit] => match ctx.part(AssignmentP).lit_value(lit) {
            Some(true) => (),
            Some(false) => ctx.part_mut(SolverStateP).sat_state = SatState::Unsat,
            None => enqueue_assignment(ctx.borrow(), lit, Reason::None),
        },
        ref clause_lits => {
            let cref = ctx.part_mut(ClauseStoreP).push(clause_lits);
            let (store, mut ctx) = ctx.split_part(ClauseStoreP);
            ctx.part_mut(WatchersP).watch_clause(
                cref,
                [store.watched_lit(cref, 0), store.watched_lit(cref, 1)],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use satyr_formula::lits;

    use crate::context::set_var_count;

    #[test]
    fn unsat_on_empty_clause() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &[]);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
    }

    #[test]
    fn unit_clauses() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &lits![1]);

        assert_eq!(ctx.part(TrailP).trail().len(), 1);

        load_clause(ctx.borrow(), &lits![3, -3]);

        assert_eq!(ctx.part(TrailP).trail().len(), 1);

        load_clause(ctx.borrow(), &lits![-2]);

        assert_eq!(ctx.part(TrailP).trail().len(), 2);

        load_clause(ctx.borrow(), &lits![1, 1]);

        assert_eq!(ctx.part(TrailP).trail().len(), 2);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

        load_clause(ctx.borrow(), &lits![2]);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
    }

    #[test]
    fn long_clauses() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &lits![1, 2, 3]);

        assert_eq!(ctx.part(ClauseStoreP).len(), 1);

        load_clause(ctx.borrow(), &lits![-2, 3, 3, 4]);

        assert_eq!(ctx.part(ClauseStoreP).len(), 2);

        load_clause(ctx.borrow(), &lits![4, -5, 5, 2]);

        assert_eq!(ctx.part(ClauseStoreP).len(), 2);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);
    }
}
