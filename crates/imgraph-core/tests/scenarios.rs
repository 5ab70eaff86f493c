//! # Scenario Tests (T0-T4)
//!
//! End-to-end behaviour of the public API, tier by tier.
//!
//! ## Tiers
//! - T0: Persistence and preconditions
//! - T1: Arc ordering
//! - T2: Roots, leaves and cycles
//! - T3: Closures and pruning
//! - T4: Documents and rendering

#![allow(clippy::unwrap_used, clippy::panic)]

use imgraph_core::{CycleFinder, Dir, Graph, GraphError, LabelFilter};
use std::collections::BTreeSet;

type G = Graph<&'static str, i32, &'static str>;

fn with_nodes(keys: &[&'static str]) -> G {
    keys.iter()
        .fold(G::empty(), |g, k| g.add_node(*k, 0).unwrap())
}

fn with_arcs(g: G, arcs: &[(&'static str, &'static str, &'static str)]) -> G {
    arcs.iter()
        .fold(g, |g, (label, a, b)| g.add_arc(*label, *a, *b).unwrap())
}

fn labels(ls: &[&'static str]) -> BTreeSet<&'static str> {
    ls.iter().copied().collect()
}

/// A --x--> B --y--> C --x--> A
fn xyx_ring() -> G {
    with_arcs(
        with_nodes(&["A", "B", "C"]),
        &[("x", "A", "B"), ("y", "B", "C"), ("x", "C", "A")],
    )
}

// =============================================================================
// TIER T0: PERSISTENCE AND PRECONDITIONS
// =============================================================================

mod t0_persistence {
    use super::*;

    /// T0.1: Adding a node is visible in the new graph only.
    #[test]
    fn add_node_leaves_original_untouched() {
        let g = with_nodes(&["a"]);
        let g2 = g.add_node("k", 42).unwrap();

        assert_eq!(g2.get_value(&"k"), Some(&42));
        assert!(g2.contains_node_with_key(&"k"));
        assert!(!g.contains_node_with_key(&"k"));
        assert_eq!(g.node_count(), 1);
    }

    /// T0.2: Existing keys and missing endpoints are rejected.
    #[test]
    fn preconditions_fail_fast() {
        let g = with_nodes(&["a", "b"]);

        assert_eq!(g.add_node("a", 1), Err(GraphError::KeyExists("a")));
        assert_eq!(g.add_arc("x", "a", "z"), Err(GraphError::KeyMissing("z")));
        assert_eq!(g.add_arc("x", "z", "a"), Err(GraphError::KeyMissing("z")));
        assert_eq!(
            g.add_arc_after("x", "a", "z", "b"),
            Err(GraphError::KeyMissing("z"))
        );
    }

    /// T0.3: A failed operation leaves the receiver usable and unchanged.
    #[test]
    fn failure_does_not_mutate() {
        let g = with_arcs(with_nodes(&["a", "b"]), &[("x", "a", "b")]);
        let before = g.clone();

        assert!(g.remove_node(&"a").is_err());
        assert!(g.add_arc_after("x", "a", "b", "nope").is_err());
        assert_eq!(g, before);
    }

    /// T0.4: Every empty graph is equal.
    #[test]
    fn empty_graphs_are_equal() {
        let emptied = with_nodes(&["a"]).remove_node(&"a").unwrap();
        assert_eq!(emptied, G::empty());
        assert!(emptied.is_empty());
    }
}

// =============================================================================
// TIER T1: ARC ORDERING
// =============================================================================

mod t1_arc_ordering {
    use super::*;

    /// T1.1: add then remove is an order-preserving no-op.
    #[test]
    fn add_remove_round_trip() {
        let g = with_arcs(
            with_nodes(&["a", "b", "c"]),
            &[("x", "a", "c"), ("x", "a", "b"), ("y", "c", "b")],
        );
        let round = g
            .add_arc("z", "a", "b")
            .and_then(|g2| g2.remove_arc("z", "a", "b"))
            .unwrap();

        for key in ["a", "b", "c"] {
            for dir in [Dir::In, Dir::Out] {
                assert_eq!(round.get_pairs(dir, &key), g.get_pairs(dir, &key));
            }
        }
    }

    /// T1.2: add_arc_after places the new end right after the sibling.
    #[test]
    fn add_arc_after_is_adjacent() {
        let g = with_arcs(
            with_nodes(&["a", "b", "c", "d"]),
            &[("L", "a", "d"), ("L", "a", "b")],
        );
        let g = g.add_arc_after("L", "a", "c", "b").unwrap();

        let out = g.get_connected(Dir::Out, LabelFilter::Any, &"a");
        assert_eq!(out, vec!["b", "c", "d"]);
    }

    /// T1.3: add_node_if_missing twice equals once.
    #[test]
    fn add_node_if_missing_idempotent() {
        let once = G::empty().add_node_if_missing("k", 1);
        let twice = once.add_node_if_missing("k", 1);
        assert_eq!(once, twice);
    }
}

// =============================================================================
// TIER T2: ROOTS, LEAVES AND CYCLES
// =============================================================================

mod t2_roots_leaves_cycles {
    use super::*;

    /// T2.1: An isolated node is both a root and a leaf.
    #[test]
    fn isolated_node_is_root_and_leaf() {
        let g = with_nodes(&["solo"]);
        assert_eq!(g.roots(), vec!["solo"]);
        assert_eq!(g.leaves(), vec!["solo"]);
    }

    /// T2.2: The three-arc ring is one cycle from every start.
    #[test]
    fn ring_is_one_cycle() {
        let g = xyx_ring();
        let finder = CycleFinder::new(&g);

        assert_eq!(finder.all_cycles().len(), 1);
        assert_eq!(finder.all_cycles()[0].len(), 3);

        let sets: BTreeSet<BTreeSet<_>> = ["A", "B", "C"]
            .iter()
            .map(|k| {
                let cycles = finder.cycles_starting_at(k);
                assert_eq!(cycles.len(), 1);
                cycles[0].iter().cloned().collect()
            })
            .collect();
        assert_eq!(sets.len(), 1);
    }

    /// T2.3: Pruning a pure ring changes nothing.
    #[test]
    fn remove_non_cycles_keeps_ring() {
        let g = xyx_ring();
        assert_eq!(CycleFinder::new(&g).remove_non_cycles(), g);
    }

    /// T2.4: has_cycle is seeded from roots only.
    #[test]
    fn has_cycle_is_root_seeded() {
        let ab = with_arcs(with_nodes(&["a", "b"]), &[("-", "a", "b"), ("-", "b", "a")]);
        // No root, so the root-seeded check sees nothing...
        assert!(!ab.has_cycle());
        // ...while the cycle finder examines every node.
        assert_eq!(CycleFinder::new(&ab).all_cycles().len(), 1);

        // Give the ring a root and it is found.
        let rooted = ab
            .add_node("r", 0)
            .and_then(|g| g.add_arc("-", "r", "a"))
            .unwrap();
        assert!(rooted.has_cycle());
    }

    /// T2.5: Tails on both sides of a loop are stripped.
    #[test]
    fn remove_non_cycles_strips_tails() {
        let g = with_arcs(
            with_nodes(&["in", "a", "b", "out"]),
            &[("-", "in", "a"), ("-", "a", "b"), ("-", "b", "a"), ("-", "b", "out")],
        );
        let pruned = CycleFinder::new(&g).remove_non_cycles();

        assert_eq!(pruned.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(pruned.arc_count(), 2);
    }
}

// =============================================================================
// TIER T3: CLOSURES AND PRUNING
// =============================================================================

mod t3_closures {
    use super::*;

    /// T3.1: get_closure excludes its start, even on a ring.
    #[test]
    fn closure_on_ring_excludes_start() {
        let g = xyx_ring();
        let xy = labels(&["x", "y"]);

        assert_eq!(g.get_closure(Dir::Out, LabelFilter::In(&xy), &"A"), vec!["B", "C"]);
        // Only x arcs: A -> B, then B has no x arc out
        assert_eq!(g.get_closure(Dir::Out, LabelFilter::Is(&"x"), &"A"), vec!["B"]);
    }

    /// T3.2: A diamond is closed over once per node.
    #[test]
    fn diamond_inclusive_closure() {
        let g = with_arcs(
            with_nodes(&["A", "B", "C", "D"]),
            &[("-", "A", "B"), ("-", "A", "C"), ("-", "B", "D"), ("-", "C", "D")],
        );
        let closure = g.get_inclusive_closure(Dir::Out, LabelFilter::Any, &["A"]);

        assert_eq!(closure.len(), 4);
        assert_eq!(
            closure.iter().copied().collect::<BTreeSet<_>>(),
            labels(&["A", "B", "C", "D"])
        );
    }

    /// T3.3: In-order closure lists every key before anything it reaches.
    #[test]
    fn in_order_closure_respects_reachability() {
        let g = with_arcs(
            with_nodes(&["A", "B", "C", "D"]),
            &[("-", "A", "B"), ("-", "A", "C"), ("-", "B", "D"), ("-", "C", "D")],
        );
        let order = g.get_in_order_closure(Dir::Out, LabelFilter::Any, &["A"]);
        let pos = |k: &str| order.iter().position(|x| *x == k).unwrap();

        assert_eq!(order.len(), 4);
        assert!(pos("A") < pos("B"));
        assert!(pos("A") < pos("C"));
        assert!(pos("B") < pos("D"));
        assert!(pos("C") < pos("D"));
    }

    /// T3.4: Shrinking removes unreachable nodes and every arc touching them.
    #[test]
    fn shrink_to_x_closure() {
        let g = with_arcs(
            with_nodes(&["A", "B", "C", "D", "E"]),
            &[
                ("x", "A", "B"),
                ("x", "B", "C"),
                ("y", "A", "D"),
                ("x", "E", "A"),
                ("x", "D", "C"),
            ],
        );
        let shrunk = g.shrink_to_inclusive_closure_of(&labels(&["x"]), &["A"]);

        assert_eq!(shrunk.keys().copied().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(shrunk.arc_count(), 2);
        assert_eq!(shrunk.get_connected(Dir::In, LabelFilter::Any, &"A"), Vec::<&str>::new());
        assert_eq!(shrunk.get_connected(Dir::In, LabelFilter::Any, &"C"), vec!["B"]);
    }
}

// =============================================================================
// TIER T4: DOCUMENTS AND RENDERING
// =============================================================================

mod t4_documents {
    use imgraph_core::formats::{self, DocumentFormat};
    use imgraph_core::{CycleFinder, Graph};

    type SG = Graph<String, serde_json::Value, String>;

    const TOML: &str = r#"
        [[nodes]]
        key = "A"
        value = "first"

        [[nodes]]
        key = "B"

        [[nodes]]
        key = "C"

        [[arcs]]
        label = "x"
        start = "A"
        end = "B"

        [[arcs]]
        label = "y"
        start = "B"
        end = "C"

        [[arcs]]
        label = "x"
        start = "C"
        end = "A"
    "#;

    /// T4.1: A TOML file loads into the expected ring.
    #[test]
    fn load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ring.toml");
        std::fs::write(&path, TOML).unwrap();

        let g: SG = formats::load(&path, None).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.get_value(&"A".to_string()), Some(&serde_json::json!("first")));
        assert_eq!(g.get_value(&"B".to_string()), Some(&serde_json::Value::Null));
        assert_eq!(CycleFinder::new(&g).all_cycles().len(), 1);

        let explicit: SG = formats::load(&path, Some(DocumentFormat::Toml)).unwrap();
        assert_eq!(explicit, g);
    }

    /// T4.2: Export to JSON and back keeps nodes, values and arcs.
    #[test]
    fn json_export_reloads() {
        let g: SG = formats::from_toml_str(TOML).unwrap();
        let json = formats::to_json_string(&g).unwrap();
        let back: SG = formats::from_json_str(&json).unwrap();

        assert_eq!(back.keys().collect::<Vec<_>>(), g.keys().collect::<Vec<_>>());
        assert_eq!(back.values().collect::<Vec<_>>(), g.values().collect::<Vec<_>>());
        assert_eq!(back.arcs().collect::<Vec<_>>(), g.arcs().collect::<Vec<_>>());
    }

    /// T4.3: A rootless ring still renders every node.
    #[test]
    fn show_rootless_ring() {
        let g: SG = formats::from_toml_str(TOML).unwrap();
        let text = g.show().to_string();

        assert_eq!(text.lines().next(), Some("|--> A"));
        assert!(text.contains("|- x -> B"));
        assert!(text.contains("|- y -> C"));
        assert!(text.contains("|- x -> (A)"));
    }
}
