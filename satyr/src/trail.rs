//! Partial assignment, trail and implication graph.
use partial_ref::{partial, PartialRef};

use crate::clauses::ClauseRef;
use crate::context::{ActivityQueueP, AssignmentP, Context, ImplGraphP, TrailP};
use crate::decision::make_available;
use crate::lit::{Lit, LitIdx, Var};

/// Current partial assignment.
#[derive(Default)]
pub struct Assignment {
    values: Vec<Option<bool>>,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.values.resize(count, None);
    }

    /// Current partial assignment as a slice.
    pub fn values(&self) -> &[Option<bool>] {
        &self.values
    }

    /// Value assigned to a variable.
    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.values[var.index()]
    }

    /// Value assigned to a literal.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.values[lit.index()].map(|value| value ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.values[lit.index()] == Some(lit.is_positive())
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.values[lit.index()] == Some(lit.is_negative())
    }

    pub fn lit_is_unk(&self, lit: Lit) -> bool {
        self.values[lit.index()].is_none()
    }

    fn assign_lit(&mut self, lit: Lit) {
        self.values[lit.index()] = Some(lit.is_positive())
    }

    fn clear_var(&mut self, var: Var) {
        self.values[var.index()] = None
    }
}

/// Why a variable has its value.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Reason {
    /// A decision or a top level unit.
    None,
    /// Propagated by a clause whose other literals are all false.
    Clause(ClauseRef),
}

impl Default for Reason {
    fn default() -> Reason {
        Reason::None
    }
}

/// Level and antecedent of an assigned variable.
#[derive(Copy, Clone, Default)]
pub struct ImplNode {
    pub reason: Reason,
    pub level: LitIdx,
}

/// The implication graph.
///
/// Holds stale data for unassigned variables.
#[derive(Default)]
pub struct ImplGraph {
    nodes: Vec<ImplNode>,
}

impl ImplGraph {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.nodes.resize(count, ImplNode::default());
    }

    /// The antecedent of an assigned variable.
    pub fn reason(&self, var: Var) -> Reason {
        self.nodes[var.index()].reason
    }

    /// The decision level of an assigned variable.
    pub fn level(&self, var: Var) -> usize {
        self.nodes[var.index()].level as usize
    }

    fn set(&mut self, var: Var, reason: Reason, level: usize) {
        self.nodes[var.index()] = ImplNode {
            reason,
            level: level as LitIdx,
        };
    }
}

/// Assignments in the order they were made, plus the propagation queue.
#[derive(Default)]
pub struct Trail {
    trail: Vec<Lit>,
    /// Index of the next assignment to propagate.
    queue_head: usize,
    level: usize,
}

impl Trail {
    /// Assigned literals in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Number of assignments on the trail.
    pub fn len(&self) -> usize {
        self.trail.len()
    }

    /// Take the next assignment to propagate off the queue.
    pub fn pop_queue(&mut self) -> Option<Lit> {
        let head = self.trail.get(self.queue_head).cloned();
        if head.is_some() {
            self.queue_head += 1;
        }
        head
    }

    /// Whether every assignment has been propagated.
    pub fn fully_propagated(&self) -> bool {
        self.queue_head == self.trail.len()
    }

    /// Current decision level.
    pub fn current_level(&self) -> usize {
        self.level
    }

    /// Enter a decision level.
    pub fn set_level(&mut self, level: usize) {
        self.level = level;
    }
}

/// Record the assignment of a literal at the current level.
///
/// Updates assignment, trail and implication graph but does not propagate.
/// The literal must be unassigned.
pub fn enqueue_assignment(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP),
    lit: Lit,
    reason: Reason,
) {
    let assignment = ctx.part_mut(AssignmentP);
    debug_assert!(assignment.lit_value(lit) == None);

    assignment.assign_lit(lit);

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    // Top level assignments never keep a clause antecedent, so rebuilding the
    // clause store during preprocessing cannot leave dangling references.
    let reason = if trail.level == 0 { Reason::None } else { reason };

    trail.trail.push(lit);
    ctx.part_mut(ImplGraphP).set(lit.var(), reason, trail.level);
}

/// Undo all assignments above the given level and make it current.
///
/// Every unassigned variable goes back into the activity queue at its current
/// priority. Level 0 assignments are permanent.
pub fn backtrack(
    mut ctx: partial!(
        Context,
        mut ActivityQueueP,
        mut AssignmentP,
        mut TrailP,
        ImplGraphP,
    ),
    level: usize,
) {
    let (assignment, mut ctx) = ctx.split_part_mut(AssignmentP);
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    let (graph, mut ctx) = ctx.split_part(ImplGraphP);

    while let Some(&lit) = trail.trail.last() {
        if graph.level(lit.var()) <= level {
            break;
        }
        make_available(ctx.borrow(), lit.var());
        assignment.clear_var(lit.var());
        trail.trail.pop();
    }

    trail.queue_head = trail.trail.len();
    trail.level = level;
}
