//! # Query Module
//!
//! Read-only adjacency and reachability queries over a [`Graph`], the
//! reachability `partition`, plus the closure-based pruning
//! `shrink_to_inclusive_closure_of`.
//!
//! - Every traversal is parameterised on [`Dir`] instead of having in/out twins
//! - Closures are explicit worklist loops, so deep chains cannot overflow the stack
//! - Results are returned in discovery order, which is deterministic because
//!   the underlying maps are ordered

use crate::{Dir, Graph, LabelFilter};
use std::collections::{BTreeSet, VecDeque};

impl<K, D, L> Graph<K, D, L>
where
    K: Ord + Clone,
    D: Clone,
    L: Ord + Clone,
{
    // =========================================================================
    // ADJACENCY
    // =========================================================================

    /// The neighbours of `key` in direction `dir` reached by one arc whose
    /// label passes `labels`, in adjacency-list order.
    #[must_use]
    pub fn get_connected(&self, dir: Dir, labels: LabelFilter<'_, L>, key: &K) -> Vec<K> {
        self.connected_iter(dir, labels, key).cloned().collect()
    }

    fn connected_iter<'a>(
        &'a self,
        dir: Dir,
        labels: LabelFilter<'a, L>,
        key: &K,
    ) -> impl Iterator<Item = &'a K> + use<'a, K, D, L> {
        self.get_arcs(dir, key)
            .filter(move |arc| labels.accepts(&arc.label))
            .map(move |arc| arc.slot(dir))
    }

    // =========================================================================
    // CLOSURES
    // =========================================================================

    /// The keys reachable from `key` by one or more arcs in direction `dir`
    /// whose labels pass `labels`.
    ///
    /// `key` itself is never part of the result, even when it lies on a
    /// cycle. Keys are listed in the order a breadth-first worklist finds them.
    #[must_use]
    pub fn get_closure(&self, dir: Dir, labels: LabelFilter<'_, L>, key: &K) -> Vec<K> {
        let seeds = self.get_connected(dir, labels, key);
        let mut closure = self.get_inclusive_closure(dir, labels, &seeds);
        closure.retain(|k| k != key);
        closure
    }

    /// The closure of `keys`, each start key included.
    ///
    /// Worklist algorithm: pop the head; skip it if already found, otherwise
    /// record it and push its filtered neighbours on the tail. Cycles are
    /// harmless because found keys are never expanded twice.
    #[must_use]
    pub fn get_inclusive_closure(&self, dir: Dir, labels: LabelFilter<'_, L>, keys: &[K]) -> Vec<K> {
        let mut found: BTreeSet<K> = BTreeSet::new();
        let mut order: Vec<K> = Vec::new();
        let mut work: VecDeque<K> = keys.iter().cloned().collect();

        while let Some(key) = work.pop_front() {
            if found.contains(&key) {
                continue;
            }
            work.extend(self.connected_iter(dir, labels, &key).cloned());
            found.insert(key.clone());
            order.push(key);
        }

        order
    }

    /// The inclusive closure of `keys` ordered so that, for any `a` listed
    /// before `b`, there is no path from `b` to `a` in direction `dir`
    /// (outside of cycles, where no such order exists).
    ///
    /// Depth-first: a key is placed at the front of the result only after
    /// everything reachable from it has been placed, so dependents come
    /// before their dependencies. Start keys are processed in order; keys
    /// already visited are skipped.
    #[must_use]
    pub fn get_in_order_closure(&self, dir: Dir, labels: LabelFilter<'_, L>, keys: &[K]) -> Vec<K> {
        let mut visited: BTreeSet<K> = BTreeSet::new();
        let mut result: VecDeque<K> = VecDeque::new();

        for start in keys {
            if !visited.insert(start.clone()) {
                continue;
            }

            // Each frame: a key and the neighbours still to visit.
            let mut stack: Vec<(K, VecDeque<K>)> =
                vec![(start.clone(), self.get_connected(dir, labels, start).into())];

            while let Some((_, pending)) = stack.last_mut() {
                match pending.pop_front() {
                    Some(next) => {
                        if visited.insert(next.clone()) {
                            let neighbours = self.get_connected(dir, labels, &next).into();
                            stack.push((next, neighbours));
                        }
                    }
                    None => {
                        if let Some((done, _)) = stack.pop() {
                            result.push_front(done);
                        }
                    }
                }
            }
        }

        result.into()
    }

    /// The keys reachable in one or more steps from `candidates`, where the
    /// steps are given by `adjacent` instead of by the arcs of the graph.
    ///
    /// A candidate is part of the result only if it is reachable itself.
    #[must_use]
    pub fn get_closure_by<F, I>(&self, mut adjacent: F, candidates: &[K]) -> BTreeSet<K>
    where
        F: FnMut(&K) -> I,
        I: IntoIterator<Item = K>,
    {
        let mut found: BTreeSet<K> = BTreeSet::new();
        let mut work: Vec<K> = candidates.iter().flat_map(&mut adjacent).collect();

        while let Some(key) = work.pop() {
            if !found.contains(&key) {
                work.extend(adjacent(&key));
                found.insert(key);
            }
        }

        found
    }

    /// Every maximal path from `key` following arcs in direction `dir` whose
    /// labels pass `labels`. Each path starts with `key`.
    ///
    /// A path ends at a key with no further arcs, or just before a key that is
    /// already on the path. The number of paths can grow exponentially.
    #[must_use]
    pub fn get_paths(&self, dir: Dir, labels: LabelFilter<'_, L>, key: &K) -> Vec<Vec<K>> {
        let mut paths = Vec::new();
        let mut path = vec![key.clone()];
        self.extend_paths(dir, labels, &mut path, &mut paths);
        paths
    }

    fn extend_paths(
        &self,
        dir: Dir,
        labels: LabelFilter<'_, L>,
        path: &mut Vec<K>,
        paths: &mut Vec<Vec<K>>,
    ) {
        let Some(last) = path.last().cloned() else {
            return;
        };
        let next: Vec<K> = self
            .connected_iter(dir, labels, &last)
            .filter(|k| !path.contains(k))
            .cloned()
            .collect();

        if next.is_empty() {
            paths.push(path.clone());
            return;
        }
        for k in next {
            path.push(k);
            self.extend_paths(dir, labels, path, paths);
            path.pop();
        }
    }

    // =========================================================================
    // ROOTS, LEAVES, CYCLES
    // =========================================================================

    /// Keys with no incoming arcs, in key order.
    #[must_use]
    pub fn roots(&self) -> Vec<K> {
        self.keys()
            .filter(|k| !self.arcs_in.contains_key(*k))
            .cloned()
            .collect()
    }

    /// Keys with no outgoing arcs, in key order.
    #[must_use]
    pub fn leaves(&self) -> Vec<K> {
        self.keys()
            .filter(|k| !self.arcs_out.contains_key(*k))
            .cloned()
            .collect()
    }

    /// `true` if the graph has a self-loop, or a cycle reachable by following
    /// outgoing arcs from some root.
    ///
    /// The search is seeded from [`Graph::roots`] only: a cycle that no root
    /// can reach (for example a graph that is a single ring of two or more
    /// nodes) is not reported. Use `CycleFinder::all_cycles` to examine every
    /// node.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        if self.arcs().any(|arc| arc.start == arc.end) {
            return true;
        }

        // Keys whose reachable subgraph is fully explored without a cycle.
        let mut finished: BTreeSet<K> = BTreeSet::new();

        for root in self.roots() {
            let mut on_path: BTreeSet<K> = BTreeSet::new();
            on_path.insert(root.clone());
            let mut stack: Vec<(K, VecDeque<K>)> =
                vec![(root.clone(), self.get_connected(Dir::Out, LabelFilter::Any, &root).into())];

            while let Some((_, pending)) = stack.last_mut() {
                match pending.pop_front() {
                    Some(next) => {
                        if on_path.contains(&next) {
                            return true;
                        }
                        if !finished.contains(&next) {
                            let neighbours =
                                self.get_connected(Dir::Out, LabelFilter::Any, &next).into();
                            on_path.insert(next.clone());
                            stack.push((next, neighbours));
                        }
                    }
                    None => {
                        if let Some((done, _)) = stack.pop() {
                            on_path.remove(&done);
                            finished.insert(done);
                        }
                    }
                }
            }
        }

        false
    }

    /// The graph split into groups of keys reachable by outgoing arcs.
    ///
    /// Only keys with outgoing arcs or no arcs at all start a group. The
    /// smallest such key not yet covered starts the next group, which holds it
    /// and everything it reaches. Groups can overlap; together they cover
    /// every key.
    #[must_use]
    pub fn partition(&self) -> Vec<BTreeSet<K>> {
        let mut remaining: BTreeSet<K> = self
            .keys()
            .filter(|k| self.arcs_out.contains_key(*k) || !self.arcs_in.contains_key(*k))
            .cloned()
            .collect();
        let mut parts = Vec::new();

        while let Some(start) = remaining.pop_first() {
            let mut reachable = self.get_closure_by(
                |k| self.get_connected(Dir::Out, LabelFilter::Any, k),
                std::slice::from_ref(&start),
            );
            reachable.insert(start);
            remaining.retain(|k| !reachable.contains(k));
            parts.push(reachable);
        }

        parts
    }

    // =========================================================================
    // PRUNING
    // =========================================================================

    /// The graph restricted to the in-order closure of `keys` following
    /// outgoing arcs whose labels are in `labels`.
    ///
    /// Every node outside the closure is removed together with every arc
    /// that starts or ends at it. Start keys not in the graph are ignored.
    #[must_use]
    pub fn shrink_to_inclusive_closure_of(&self, labels: &BTreeSet<L>, keys: &[K]) -> Self {
        let closure: BTreeSet<K> = self
            .get_in_order_closure(Dir::Out, LabelFilter::In(labels), keys)
            .into_iter()
            .collect();

        let outside: BTreeSet<K> = self
            .keys()
            .filter(|k| !closure.contains(*k))
            .cloned()
            .collect();

        tracing::debug!(
            kept = closure.len(),
            removed = outside.len(),
            "shrinking graph to inclusive closure"
        );

        self.detach_nodes(&outside)
    }
}

// =============================================================================
// TESTS
// =============================================================================
