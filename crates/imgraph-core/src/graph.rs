//! # Graph Engine
//!
//! The immutable graph storage for imgraph CORE.
//!
//! A `Graph` is three persistent ordered maps:
//! - `values`: key -> node data
//! - `arcs_out`: key -> ordered list of arcs whose `start` is the key
//! - `arcs_in`: key -> ordered list of arcs whose `end` is the key
//!
//! Every structural operation takes `&self` and returns a new graph. The
//! maps share structure with the graph they were derived from, so a clone is
//! O(1) and each change copies O(log n) map nodes. The receiver is never
//! modified and stays valid after the call, whether it succeeded or not.

use crate::{Arc, Dir, GraphError};
use imbl::{OrdMap, Vector};
use std::collections::BTreeSet;

/// Adjacency index: key -> ordered arc list.
pub(crate) type ArcIndex<K, L> = OrdMap<K, Vector<Arc<K, L>>>;

// =============================================================================
// GRAPH
// =============================================================================

/// An immutable, directed, labeled graph.
///
/// - `K`: node key, ordered and cheap enough to clone
/// - `D`: data attached to each node, never interpreted by the graph
/// - `L`: arc label, used to filter traversals
///
/// Arcs are kept in two indices, by start and by end. Every arc appears in
/// exactly one `arcs_out` list and exactly one `arcs_in` list. The order of an
/// out-list is controlled by the caller (`add_arc`, `add_arc_as_last`,
/// `add_arc_after`); empty lists are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph<K, D, L>
where
    K: Ord + Clone,
    D: Clone,
    L: Ord + Clone,
{
    pub(crate) values: OrdMap<K, D>,
    pub(crate) arcs_out: ArcIndex<K, L>,
    pub(crate) arcs_in: ArcIndex<K, L>,
}

impl<K, D, L> Default for Graph<K, D, L>
where
    K: Ord + Clone,
    D: Clone,
    L: Ord + Clone,
{
    fn default() -> Self {
        Self {
            values: OrdMap::new(),
            arcs_out: OrdMap::new(),
            arcs_in: OrdMap::new(),
        }
    }
}

/// Where a new arc goes in the out-list of its start node.
enum Placement<'a, K, L> {
    First,
    Last,
    After(&'a Arc<K, L>),
}

impl<K, D, L> Graph<K, D, L>
where
    K: Ord + Clone,
    D: Clone,
    L: Ord + Clone,
{
    /// The empty graph.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    // =========================================================================
    // NODES
    // =========================================================================

    /// Add a node with key `key` and data `value`.
    ///
    /// Fails with `KeyExists` if a node with that key is already present.
    pub fn add_node(&self, key: K, value: D) -> Result<Self, GraphError<K, L>> {
        self.must_not_contain(&key)?;

        Ok(Self {
            values: self.values.update(key, value),
            ..self.clone()
        })
    }

    /// Add a node unless one with `key` already exists, in which case the
    /// graph is returned unchanged.
    #[must_use]
    pub fn add_node_if_missing(&self, key: K, value: D) -> Self {
        if self.contains_node_with_key(&key) {
            return self.clone();
        }
        Self {
            values: self.values.update(key, value),
            ..self.clone()
        }
    }

    /// Add the node `child_key` (if missing) and an arc `label` from
    /// `parent_key` to it.
    pub fn add_node_to_parent(
        &self,
        label: L,
        parent_key: K,
        child_key: K,
        child_value: D,
    ) -> Result<Self, GraphError<K, L>> {
        self.must_contain(&parent_key)?;

        self.add_node_if_missing(child_key.clone(), child_value)
            .add_arc(label, parent_key, child_key)
    }

    /// Remove the node with key `key`.
    ///
    /// Fails with `KeyMissing` if absent and with `NodeHasArcs` while any arc
    /// still starts or ends at the node.
    pub fn remove_node(&self, key: &K) -> Result<Self, GraphError<K, L>> {
        self.must_contain(key)?;

        let incident: Vec<Arc<K, L>> = self
            .get_arcs(Dir::In, key)
            .chain(self.get_arcs(Dir::Out, key))
            .cloned()
            .collect();

        if !incident.is_empty() {
            return Err(GraphError::NodeHasArcs {
                key: key.clone(),
                arcs: incident,
            });
        }

        Ok(Self {
            values: self.values.without(key),
            ..self.clone()
        })
    }

    /// Remove every node in `keys` together with all arcs incident on them.
    ///
    /// Fails with `KeyMissing` for the first key that is not in the graph.
    pub fn remove_nodes<'a, I>(&self, keys: I) -> Result<Self, GraphError<K, L>>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let keys: BTreeSet<K> = keys.into_iter().cloned().collect();
        if let Some(missing) = keys.iter().find(|k| !self.contains_node_with_key(k)) {
            return Err(GraphError::KeyMissing(missing.clone()));
        }
        Ok(self.detach_nodes(&keys))
    }

    /// Remove `keys` and every incident arc. Keys not in the graph are ignored.
    pub(crate) fn detach_nodes(&self, keys: &BTreeSet<K>) -> Self {
        let mut graph = self.clone();

        for key in keys {
            if let Some(out) = graph.arcs_out.remove(key) {
                for arc in &out {
                    strip_arc(&mut graph.arcs_in, &arc.end, arc);
                }
            }
            if let Some(incoming) = graph.arcs_in.remove(key) {
                for arc in &incoming {
                    strip_arc(&mut graph.arcs_out, &arc.start, arc);
                }
            }
            graph.values.remove(key);
        }

        graph
    }

    // =========================================================================
    // ARCS
    // =========================================================================

    /// Add an arc `label` from `start` to `end`, placed first in the out-list
    /// of `start` and first in the in-list of `end`.
    pub fn add_arc(&self, label: L, start: K, end: K) -> Result<Self, GraphError<K, L>> {
        self.insert_arc(Arc::new(label, start, end), Placement::First)
    }

    /// Add an arc `label` from `start` to `end`, placed last in both lists.
    pub fn add_arc_as_last(&self, label: L, start: K, end: K) -> Result<Self, GraphError<K, L>> {
        self.insert_arc(Arc::new(label, start, end), Placement::Last)
    }

    /// Add an arc `label` from `start` to `end` immediately after the existing
    /// arc `label` from `start` to `after` in the out-list of `start`.
    ///
    /// The in-list of `end` gains the arc at its front. Fails with
    /// `AfterKeyMissing` if the sibling arc does not exist.
    pub fn add_arc_after(
        &self,
        label: L,
        start: K,
        end: K,
        after: K,
    ) -> Result<Self, GraphError<K, L>> {
        let sibling = Arc::new(label.clone(), start.clone(), after);
        self.insert_arc(Arc::new(label, start, end), Placement::After(&sibling))
    }

    fn insert_arc(
        &self,
        arc: Arc<K, L>,
        placement: Placement<'_, K, L>,
    ) -> Result<Self, GraphError<K, L>> {
        self.must_contain(&arc.start)?;
        self.must_contain(&arc.end)?;

        let mut out = self.arcs_out.get(&arc.start).cloned().unwrap_or_default();
        let mut incoming = self.arcs_in.get(&arc.end).cloned().unwrap_or_default();

        match placement {
            Placement::First => {
                out.push_front(arc.clone());
                incoming.push_front(arc.clone());
            }
            Placement::Last => {
                out.push_back(arc.clone());
                incoming.push_back(arc.clone());
            }
            Placement::After(sibling) => {
                let Some(index) = out.iter().position(|a| a == sibling) else {
                    return Err(GraphError::AfterKeyMissing {
                        start: sibling.start.clone(),
                        label: sibling.label.clone(),
                        after: sibling.end.clone(),
                    });
                };
                out.insert(index + 1, arc.clone());
                incoming.push_front(arc.clone());
            }
        }

        Ok(Self {
            values: self.values.clone(),
            arcs_out: self.arcs_out.update(arc.start.clone(), out),
            arcs_in: self.arcs_in.update(arc.end, incoming),
        })
    }

    /// Remove every arc `label` from `start` to `end`.
    ///
    /// Fails with `KeyMissing` if either endpoint is absent. Removing an arc
    /// that does not exist returns an equal graph.
    pub fn remove_arc(&self, label: L, start: K, end: K) -> Result<Self, GraphError<K, L>> {
        self.must_contain(&start)?;
        self.must_contain(&end)?;

        Ok(self.without_arc(&Arc::new(label, start, end)))
    }

    /// Remove every arc equal to `arc`, without checking its endpoints.
    #[must_use]
    pub fn without_arc(&self, arc: &Arc<K, L>) -> Self {
        let mut arcs_out = self.arcs_out.clone();
        let mut arcs_in = self.arcs_in.clone();
        strip_arc(&mut arcs_out, &arc.start, arc);
        strip_arc(&mut arcs_in, &arc.end, arc);

        Self {
            values: self.values.clone(),
            arcs_out,
            arcs_in,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// `true` if the graph contains a node with key `key`.
    #[must_use]
    pub fn contains_node_with_key(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// The data of the node with key `key`, or `None` if there is no such node.
    #[must_use]
    pub fn get_value(&self, key: &K) -> Option<&D> {
        self.values.get(key)
    }

    /// The data of each key in `keys`, `None` for keys not in the graph.
    pub fn get_values_from_keys<'a>(
        &'a self,
        keys: &'a [K],
    ) -> impl Iterator<Item = Option<&'a D>> + 'a {
        keys.iter().map(|k| self.get_value(k))
    }

    /// All node keys, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.values.keys()
    }

    /// All node data values, in key order.
    pub fn values(&self) -> impl Iterator<Item = &D> + '_ {
        self.values.values()
    }

    /// All arcs, grouped by start key in key order, each group in out-list order.
    pub fn arcs(&self) -> impl Iterator<Item = &Arc<K, L>> + '_ {
        self.arcs_out.values().flat_map(|list| list.iter())
    }

    /// The arcs on `key` in direction `dir`, in adjacency-list order.
    pub fn get_arcs<'a>(
        &'a self,
        dir: Dir,
        key: &K,
    ) -> impl Iterator<Item = &'a Arc<K, L>> + use<'a, K, D, L> {
        self.index(dir)
            .get(key)
            .into_iter()
            .flat_map(|list| list.iter())
    }

    /// The arcs on `key` in direction `dir` as (label, neighbour) pairs.
    #[must_use]
    pub fn get_pairs(&self, dir: Dir, key: &K) -> Vec<(L, K)> {
        self.get_arcs(dir, key)
            .map(|arc| (arc.label.clone(), arc.slot(dir).clone()))
            .collect()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.values.len()
    }

    /// Number of arcs.
    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.arcs_out.values().map(Vector::len).sum()
    }

    /// `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The graph with the same nodes and arcs but every data value replaced
    /// by `f(value)`.
    #[must_use]
    pub fn map<D2, F>(&self, mut f: F) -> Graph<K, D2, L>
    where
        D2: Clone,
        F: FnMut(&D) -> D2,
    {
        Graph {
            values: self.values.iter().map(|(k, v)| (k.clone(), f(v))).collect(),
            arcs_out: self.arcs_out.clone(),
            arcs_in: self.arcs_in.clone(),
        }
    }

    pub(crate) fn index(&self, dir: Dir) -> &ArcIndex<K, L> {
        match dir {
            Dir::Out => &self.arcs_out,
            Dir::In => &self.arcs_in,
        }
    }

    fn must_contain(&self, key: &K) -> Result<(), GraphError<K, L>> {
        if self.contains_node_with_key(key) {
            Ok(())
        } else {
            Err(GraphError::KeyMissing(key.clone()))
        }
    }

    fn must_not_contain(&self, key: &K) -> Result<(), GraphError<K, L>> {
        if self.contains_node_with_key(key) {
            Err(GraphError::KeyExists(key.clone()))
        } else {
            Ok(())
        }
    }
}

/// Drop every copy of `arc` from the list at `key`, removing the entry when
/// the list becomes empty.
pub(crate) fn strip_arc<K, L>(index: &mut ArcIndex<K, L>, key: &K, arc: &Arc<K, L>)
where
    K: Ord + Clone,
    L: Ord + Clone,
{
    let Some(list) = index.get(key) else {
        return;
    };
    let mut kept = list.clone();
    kept.retain(|a| a != arc);

    if kept.is_empty() {
        index.remove(key);
    } else {
        index.insert(key.clone(), kept);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LabelFilter;

    type G = Graph<&'static str, i32, &'static str>;

    fn nodes(keys: &[&'static str]) -> G {
        keys.iter()
            .enumerate()
            .fold(G::empty(), |g, (i, k)| g.add_node(*k, i as i32).expect("add"))
    }

    fn out_keys(g: &G, key: &'static str) -> Vec<&'static str> {
        g.get_arcs(Dir::Out, &key).map(|a| a.end).collect()
    }

    #[test]
    fn add_node_and_get_value() {
        let g0 = G::empty();
        let g1 = g0.add_node("a", 7).expect("add");

        assert!(g1.contains_node_with_key(&"a"));
        assert_eq!(g1.get_value(&"a"), Some(&7));
        // Original graph is untouched
        assert!(!g0.contains_node_with_key(&"a"));
        assert!(g0.is_empty());
    }

    #[test]
    fn add_existing_node_fails() {
        let g = nodes(&["a"]);
        assert_eq!(g.add_node("a", 1), Err(GraphError::KeyExists("a")));
    }

    #[test]
    fn add_node_if_missing_keeps_first_value() {
        let g = G::empty().add_node_if_missing("a", 1);
        let g2 = g.add_node_if_missing("a", 2);

        assert_eq!(g, g2);
        assert_eq!(g2.get_value(&"a"), Some(&1));
    }

    #[test]
    fn add_arc_requires_both_endpoints() {
        let g = nodes(&["a"]);
        assert_eq!(g.add_arc("x", "a", "b"), Err(GraphError::KeyMissing("b")));
        assert_eq!(g.add_arc("x", "b", "a"), Err(GraphError::KeyMissing("b")));
    }

    #[test]
    fn add_arc_prepends_and_as_last_appends() {
        let g = nodes(&["a", "b", "c", "d"])
            .add_arc("x", "a", "b")
            .and_then(|g| g.add_arc("x", "a", "c"))
            .and_then(|g| g.add_arc_as_last("x", "a", "d"))
            .expect("arcs");

        assert_eq!(out_keys(&g, "a"), vec!["c", "b", "d"]);
        assert_eq!(g.arc_count(), 3);
    }

    #[test]
    fn in_lists_follow_placement() {
        let g = nodes(&["0", "1", "2", "3"])
            .add_arc("x", "1", "0")
            .and_then(|g| g.add_arc("x", "2", "0"))
            .and_then(|g| g.add_arc_as_last("x", "3", "0"))
            .expect("arcs");

        assert_eq!(g.get_connected(Dir::In, LabelFilter::Any, &"0"), vec!["2", "1", "3"]);

        // add_arc_after splices the out-list but still prepends to the in-list
        let g = g
            .add_arc("x", "2", "1")
            .and_then(|g| g.add_arc_after("x", "3", "1", "0"))
            .expect("arcs");

        assert_eq!(out_keys(&g, "3"), vec!["0", "1"]);
        assert_eq!(g.get_connected(Dir::In, LabelFilter::Any, &"1"), vec!["3", "2"]);
        assert_eq!(g.get_connected(Dir::In, LabelFilter::Any, &"0"), vec!["2", "1", "3"]);
    }

    #[test]
    fn add_arc_after_splices_out_list() {
        let g = nodes(&["1", "2", "3", "4", "5"])
            .add_arc("child", "1", "5")
            .and_then(|g| g.add_arc("child", "1", "2"))
            .and_then(|g| g.add_arc_after("child", "1", "3", "2"))
            .and_then(|g| g.add_arc_after("child", "1", "4", "3"))
            .expect("arcs");

        assert_eq!(out_keys(&g, "1"), vec!["2", "3", "4", "5"]);

        let removed = g.remove_arc("child", "1", "3").expect("remove");
        assert_eq!(out_keys(&removed, "1"), vec!["2", "4", "5"]);
    }

    #[test]
    fn add_arc_after_missing_sibling_fails() {
        let g = nodes(&["1", "2", "3", "4"]);
        assert_eq!(
            g.add_arc_after("child", "1", "4", "3"),
            Err(GraphError::AfterKeyMissing {
                start: "1",
                label: "child",
                after: "3",
            })
        );
    }

    #[test]
    fn add_arc_after_checks_endpoints_first() {
        let g = nodes(&["1", "2"]);
        assert_eq!(
            g.add_arc_after("child", "1", "9", "2"),
            Err(GraphError::KeyMissing("9"))
        );
    }

    #[test]
    fn add_then_remove_arc_restores_graph() {
        let g = nodes(&["a", "b"]).add_arc("y", "a", "b").expect("arc");
        let round = g
            .add_arc("x", "a", "b")
            .and_then(|g2| g2.remove_arc("x", "a", "b"))
            .expect("round trip");

        assert_eq!(round, g);
    }

    #[test]
    fn remove_arc_drops_empty_buckets() {
        let g = nodes(&["a", "b"]);
        let round = g
            .add_arc("x", "a", "b")
            .and_then(|g2| g2.remove_arc("x", "a", "b"))
            .expect("round trip");

        assert_eq!(round, g);
        assert!(round.arcs_out.is_empty());
        assert!(round.arcs_in.is_empty());
    }

    #[test]
    fn remove_arc_removes_duplicates() {
        let g = nodes(&["a", "b"])
            .add_arc("x", "a", "b")
            .and_then(|g| g.add_arc("x", "a", "b"))
            .expect("arcs");
        assert_eq!(g.arc_count(), 2);

        let g = g.remove_arc("x", "a", "b").expect("remove");
        assert_eq!(g.arc_count(), 0);
    }

    #[test]
    fn remove_arc_missing_endpoint_fails() {
        let g = nodes(&["a"]);
        assert_eq!(g.remove_arc("x", "a", "q"), Err(GraphError::KeyMissing("q")));
    }

    #[test]
    fn remove_node_with_arcs_fails() {
        let g = nodes(&["a", "b"]).add_arc("x", "a", "b").expect("arc");

        assert_eq!(
            g.remove_node(&"b"),
            Err(GraphError::NodeHasArcs {
                key: "b",
                arcs: vec![Arc::new("x", "a", "b")],
            })
        );
    }

    #[test]
    fn remove_isolated_node() {
        let g = nodes(&["a", "b"]);
        let g2 = g.remove_node(&"a").expect("remove");

        assert!(!g2.contains_node_with_key(&"a"));
        assert!(g.contains_node_with_key(&"a"));
        assert_eq!(g2.remove_node(&"a"), Err(GraphError::KeyMissing("a")));
    }

    #[test]
    fn remove_nodes_detaches_arcs() {
        let g = nodes(&["a", "b", "c"])
            .add_arc("x", "a", "b")
            .and_then(|g| g.add_arc("x", "b", "c"))
            .and_then(|g| g.add_arc("x", "c", "a"))
            .expect("arcs");

        let g2 = g.remove_nodes(&["b"]).expect("remove");
        assert_eq!(g2.keys().copied().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(g2.arcs().cloned().collect::<Vec<_>>(), vec![Arc::new("x", "c", "a")]);
        assert_eq!(g2.get_arcs(Dir::In, &"c").count(), 0);

        assert_eq!(g.remove_nodes(&["b", "z"]), Err(GraphError::KeyMissing("z")));
    }

    #[test]
    fn add_node_to_parent_builds_tree() {
        let g = nodes(&["root"])
            .add_node_to_parent("child", "root", "a", 10)
            .and_then(|g| g.add_node_to_parent("child", "root", "b", 11))
            .expect("tree");

        assert_eq!(g.get_value(&"a"), Some(&10));
        assert_eq!(out_keys(&g, "root"), vec!["b", "a"]);
        assert_eq!(
            g.add_node_to_parent("child", "nope", "c", 1),
            Err(GraphError::KeyMissing("nope"))
        );
    }

    #[test]
    fn pairs_and_values() {
        let g = nodes(&["a", "b"]).add_arc("x", "a", "b").expect("arc");

        assert_eq!(g.get_pairs(Dir::Out, &"a"), vec![("x", "b")]);
        assert_eq!(g.get_pairs(Dir::In, &"b"), vec![("x", "a")]);
        assert_eq!(g.values().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(
            g.get_values_from_keys(&["b", "q"]).collect::<Vec<_>>(),
            vec![Some(&1), None]
        );
    }

    #[test]
    fn map_transforms_values_only() {
        let g = nodes(&["a", "b"]).add_arc("x", "a", "b").expect("arc");
        let mapped = g.map(|v| format!("v{v}"));

        assert_eq!(mapped.get_value(&"b"), Some(&"v1".to_string()));
        assert_eq!(mapped.arc_count(), 1);
        assert_eq!(g.map(|v| *v), g);
    }
}
