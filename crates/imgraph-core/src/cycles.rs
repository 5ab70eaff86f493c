//! # Cycle Finder
//!
//! Elementary-cycle enumeration and non-cycle pruning over a [`Graph`].
//!
//! Given this graph of six nodes:
//!
//! ```text
//!           4
//!       ┌─◁─▢─◁─┐
//! 1    2│   │   │5    6
//! ▢──▷──▢   △   ▢──▷──▢
//!       │   │   │
//!       └─▷─▢─▷─┘
//!           3
//! ```
//!
//! there are two cycles, `2 3 4 2` and `2 3 5 4 2`. Each is found once per
//! node on it; [`CycleFinder::all_cycles`] keeps one copy of each.
//! [`CycleFinder::remove_non_cycles`] strips 1 and 6, leaving 2, 3, 4 and 5.

use crate::{Arc, Dir, Graph};
use std::collections::{BTreeMap, BTreeSet};

/// A cycle: a closed path of arcs, the end of the last arc being the start of
/// the first.
pub type Cycle<K, L> = Vec<Arc<K, L>>;

/// Finds cycles in a borrowed graph. Holds no state besides the graph.
#[derive(Debug, Clone, Copy)]
pub struct CycleFinder<'g, K, D, L>
where
    K: Ord + Clone,
    D: Clone,
    L: Ord + Clone,
{
    graph: &'g Graph<K, D, L>,
}

impl<'g, K, D, L> CycleFinder<'g, K, D, L>
where
    K: Ord + Clone,
    D: Clone,
    L: Ord + Clone,
{
    /// Create a cycle finder over `graph`.
    #[must_use]
    pub const fn new(graph: &'g Graph<K, D, L>) -> Self {
        Self { graph }
    }

    /// Every cycle through `node` found by a depth-first walk of outgoing arcs.
    ///
    /// The walk extends a path of arcs. Reaching the first arc of the path
    /// again closes a cycle, which is recorded. Reaching any other arc already
    /// on the path abandons the branch: that cycle does not pass through
    /// `node` and is found when one of its own nodes is the start.
    #[must_use]
    pub fn cycles_starting_at(&self, node: &K) -> Vec<Cycle<K, L>> {
        let mut cycles = Vec::new();
        let mut path: Vec<Arc<K, L>> = Vec::new();
        // Frame i holds the out-arcs of the node reached by path[..i] and the
        // position of the next one to try.
        let mut stack: Vec<(Vec<Arc<K, L>>, usize)> = vec![(self.out_arcs(node), 0)];

        while let Some((arcs, next)) = stack.last_mut() {
            let Some(arc) = arcs.get(*next).cloned() else {
                stack.pop();
                path.pop();
                continue;
            };
            *next += 1;

            if path.first() == Some(&arc) {
                cycles.push(path.clone());
            } else if !path.contains(&arc) {
                let onward = self.out_arcs(&arc.end);
                path.push(arc);
                stack.push((onward, 0));
            }
        }

        cycles
    }

    /// All elementary cycles of the graph.
    ///
    /// Runs [`CycleFinder::cycles_starting_at`] from every node and keeps the
    /// first of any cycles with the same set of arcs. Exponential in the worst
    /// case; meant for small to moderate graphs.
    #[must_use]
    pub fn all_cycles(&self) -> Vec<Cycle<K, L>> {
        let mut seen: BTreeSet<BTreeSet<Arc<K, L>>> = BTreeSet::new();
        let mut found = 0usize;
        let mut cycles = Vec::new();

        for key in self.graph.keys() {
            for cycle in self.cycles_starting_at(key) {
                found += 1;
                if seen.insert(cycle.iter().cloned().collect()) {
                    cycles.push(cycle);
                }
            }
        }

        tracing::debug!(found, distinct = cycles.len(), "enumerated cycles");
        cycles
    }

    /// The graph left after repeatedly removing every root and every leaf
    /// (with their arcs) until none remain.
    ///
    /// What is left contains only nodes and arcs that lie on some cycle, or
    /// between cycles. It says nothing about how many cycles there are or how
    /// they connect.
    ///
    /// Nodes are peeled with a worklist over in/out degrees instead of
    /// recomputing roots and leaves per round; the fixpoint is the same.
    #[must_use]
    pub fn remove_non_cycles(&self) -> Graph<K, D, L> {
        let graph = self.graph;
        let mut in_degree: BTreeMap<K, usize> = BTreeMap::new();
        let mut out_degree: BTreeMap<K, usize> = BTreeMap::new();
        let mut doomed: BTreeSet<K> = BTreeSet::new();
        let mut work: Vec<K> = Vec::new();

        for key in graph.keys() {
            let ins = graph.get_arcs(Dir::In, key).count();
            let outs = graph.get_arcs(Dir::Out, key).count();
            if ins == 0 || outs == 0 {
                doomed.insert(key.clone());
                work.push(key.clone());
            }
            in_degree.insert(key.clone(), ins);
            out_degree.insert(key.clone(), outs);
        }
        tracing::trace!(initial = doomed.len(), "pruning roots and leaves");

        while let Some(key) = work.pop() {
            for arc in graph.get_arcs(Dir::Out, &key) {
                lower_degree(&mut in_degree, &arc.end, &mut doomed, &mut work);
            }
            for arc in graph.get_arcs(Dir::In, &key) {
                lower_degree(&mut out_degree, &arc.start, &mut doomed, &mut work);
            }
        }

        let pruned = graph.detach_nodes(&doomed);
        tracing::debug!(
            removed = doomed.len(),
            remaining = pruned.node_count(),
            "removed non-cycles"
        );
        pruned
    }

    fn out_arcs(&self, key: &K) -> Vec<Arc<K, L>> {
        self.graph.get_arcs(Dir::Out, key).cloned().collect()
    }
}

/// One arc of `key` went away. A key whose degree reaches zero becomes a root
/// or leaf of what is left and is queued for removal.
fn lower_degree<K: Ord + Clone>(
    degree: &mut BTreeMap<K, usize>,
    key: &K,
    doomed: &mut BTreeSet<K>,
    work: &mut Vec<K>,
) {
    if doomed.contains(key) {
        return;
    }
    if let Some(d) = degree.get_mut(key) {
        *d = d.saturating_sub(1);
        if *d == 0 {
            doomed.insert(key.clone());
            work.push(key.clone());
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
