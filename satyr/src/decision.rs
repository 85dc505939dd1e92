//! Decision heuristics.
use partial_ref::{partial, PartialRef};

use rand::Rng;

use crate::context::{
    ActivityQueueP, AssignmentP, ClauseStoreP, Context, ImplGraphP, SolverConfigP, TrailP,
};
use crate::lit::Var;
use crate::trail::{enqueue_assignment, Reason};

pub mod queue;

/// Seed the initial variable activities for the configured heuristic mode.
///
/// MOM counts occurrences in clauses up to the configured size, Jeroslow-Wang
/// weighs every occurrence by 2^-|clause|, and without either every variable
/// gets the same random score so only the tie breaking order is randomized.
/// Builds the heap afterwards.
pub fn init_heuristic(
    mut ctx: partial!(Context, mut ActivityQueueP, ClauseStoreP, SolverConfigP),
) {
    let (config, mut ctx) = ctx.split_part(SolverConfigP);
    let (store, mut ctx) = ctx.split_part(ClauseStoreP);
    let queue = ctx.part_mut(ActivityQueueP);

    if config.heuristic.mom() {
        for cref in store.refs() {
            let lits = store.lits(cref);
            if lits.len() <= config.mom_size_limit {
                for &lit in lits {
                    queue.increase_init(lit.var(), 1.0, lit.is_positive());
                }
            }
        }
    } else if config.heuristic.jw() {
        for cref in store.refs() {
            let lits = store.lits(cref);
            let score = 0.5f64.powi(lits.len() as i32);
            for &lit in lits {
                queue.increase_init(lit.var(), score, lit.is_positive());
            }
        }
    } else {
        let score = rand::thread_rng().gen::<f64>();
        for index in 0..queue.var_count() {
            queue.increase_init(Var::from_index(index), score, true);
        }
    }

    queue.heapify();
}

/// Put an unassigned variable back into the queue after backtracking.
pub fn make_available(mut ctx: partial!(Context, mut ActivityQueueP), var: Var) {
    ctx.part_mut(ActivityQueueP).restore(var);
}

/// Pick the next decision and enqueue it at a fresh decision level.
///
/// Pops the queue until an unassigned variable surfaces; its phase is the
/// polarity seen more often so far. Returns `false` without deciding when
/// every variable is assigned, i.e. the formula is satisfied.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut ActivityQueueP,
        mut AssignmentP,
        mut ImplGraphP,
        mut TrailP,
    ),
) -> bool {
    let decision = {
        let mut ctx: partial!(Context, mut ActivityQueueP, AssignmentP) = ctx.borrow();
        let (queue, mut ctx) = ctx.split_part_mut(ActivityQueueP);
        loop {
            match queue.pop() {
                None => return false,
                Some(var) => {
                    if ctx.part(AssignmentP).var_value(var).is_none() {
                        break var.lit(queue.polarity(var));
                    }
                }
            }
        }
    };

    let level = ctx.part(TrailP).current_level() + 1;
    ctx.part_mut(TrailP).set_level(level);
    enqueue_assignment(ctx.borrow(), decision, Reason::None);

    true
}
