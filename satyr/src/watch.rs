//! Watcher pool and intrusive watch lists.
//!
//! Every clause has two watchers, one per watch slot. A watcher lives in the
//! list of the literal its slot currently watches; the list keyed by a literal
//! therefore enumerates exactly the clauses watching that literal. When a
//! literal becomes false, scanning its list finds every clause that may have
//! become unit or empty.
//!
//! The lists are circular and doubly linked, threaded through a single pool
//! indexed by integers, so moving a watcher from one list to another is O(1)
//! and allocation free. The watcher of slot k of clause c is pool entry
//! 2c + k. Unassigning variables on backtracking never invalidates the watch
//! invariant, so the lists are only touched during propagation.

use crate::clauses::ClauseRef;
use crate::lit::Lit;

/// Index of a watcher in the pool.
pub type WatcherRef = u32;

/// Sentinel for an empty list head and unlinked watchers.
pub const NIL: WatcherRef = WatcherRef::max_value();

/// One watch slot of one clause, threaded into the list of its literal.
#[derive(Copy, Clone)]
struct Watcher {
    cref: ClauseRef,
    slot: u32,
    prev: WatcherRef,
    next: WatcherRef,
}

impl Watcher {
    fn unlinked() -> Watcher {
        Watcher {
            cref: ClauseRef::from_index(0),
            slot: 0,
            prev: NIL,
            next: NIL,
        }
    }
}

/// Watcher pool and per literal list heads.
#[derive(Default)]
pub struct Watchers {
    pool: Vec<Watcher>,
    /// Head watcher per literal code, `NIL` when no clause watches it.
    heads: Vec<WatcherRef>,
}

impl Watchers {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.heads.resize(count * 2, NIL);
    }

    /// Drop every list and watcher, keeping the literal index.
    pub fn reset(&mut self) {
        self.pool.clear();
        for head in self.heads.iter_mut() {
            *head = NIL;
        }
    }

    /// Start watching a clause.
    ///
    /// `lits` must be the literals in the clause's two watch slots.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        let base = cref.index() * 2;
        if self.pool.len() < base + 2 {
            self.pool.resize(base + 2, Watcher::unlinked());
        }
        for slot in 0..2 {
            let id = (base + slot) as WatcherRef;
            self.pool[base + slot] = Watcher {
                cref,
                slot: slot as u32,
                prev: NIL,
                next: NIL,
            };
            self.append(lits[slot], id);
        }
    }

    /// Head of the list of watchers watching a literal.
    pub fn head(&self, lit: Lit) -> WatcherRef {
        self.heads[lit.code()]
    }

    /// Successor of a watcher within its list.
    pub fn next_of(&self, id: WatcherRef) -> WatcherRef {
        self.pool[id as usize].next
    }

    /// The clause and watch slot of a watcher.
    pub fn watcher(&self, id: WatcherRef) -> (ClauseRef, usize) {
        let watcher = &self.pool[id as usize];
        (watcher.cref, watcher.slot as usize)
    }

    /// Link a watcher into the list of a literal, in front of the head.
    fn append(&mut self, lit: Lit, id: WatcherRef) {
        let code = lit.code();
        let head = self.heads[code];

        if head == NIL {
            self.heads[code] = id;
            self.pool[id as usize].prev = id;
            self.pool[id as usize].next = id;
            return;
        }

        let tail = self.pool[head as usize].prev;
        self.pool[id as usize].next = head;
        self.pool[id as usize].prev = tail;
        self.pool[tail as usize].next = id;
        self.pool[head as usize].prev = id;
    }

    /// Move a watcher from the list of `from` into the list of `to`.
    pub fn splice(&mut self, from: Lit, to: Lit, id: WatcherRef) {
        let from_code = from.code();

        if self.heads[from_code] == id {
            let next = self.pool[id as usize].next;
            self.heads[from_code] = if next == id { NIL } else { next };
        }

        let prev = self.pool[id as usize].prev;
        let next = self.pool[id as usize].next;
        self.pool[prev as usize].next = next;
        self.pool[next as usize].prev = prev;

        self.append(to, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use satyr_formula::lit;

    fn list_of(watchers: &Watchers, lit: Lit) -> Vec<WatcherRef> {
        let head = watchers.head(lit);
        let mut ids = vec![];
        if head == NIL {
            return ids;
        }
        let mut id = head;
        loop {
            ids.push(id);
            id = watchers.next_of(id);
            if id == head {
                return ids;
            }
        }
    }

    #[test]
    fn append_and_splice() {
        let mut watchers = Watchers::default();
        watchers.set_var_count(4);

        watchers.watch_clause(ClauseRef::from_index(0), [lit!(1), lit!(-2)]);
        watchers.watch_clause(ClauseRef::from_index(1), [lit!(1), lit!(3)]);

        assert_eq!(list_of(&watchers, lit!(1)), vec![0, 2]);
        assert_eq!(list_of(&watchers, lit!(-2)), vec![1]);
        assert_eq!(list_of(&watchers, lit!(3)), vec![3]);

        watchers.splice(lit!(1), lit!(3), 0);
        assert_eq!(list_of(&watchers, lit!(1)), vec![2]);
        assert_eq!(list_of(&watchers, lit!(3)), vec![3, 0]);

        // removing the head moves it to the next entry
        watchers.splice(lit!(3), lit!(-2), 3);
        assert_eq!(list_of(&watchers, lit!(3)), vec![0]);
        assert_eq!(list_of(&watchers, lit!(-2)), vec![1, 3]);

        // emptying a single element list leaves a NIL head
        watchers.splice(lit!(3), lit!(-2), 0);
        assert_eq!(watchers.head(lit!(3)), NIL);
        assert_eq!(list_of(&watchers, lit!(-2)), vec![1, 3, 0]);
    }
}
