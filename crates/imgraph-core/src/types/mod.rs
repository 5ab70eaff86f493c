//! # Core Type Definitions
//!
//! This module contains the value types shared by every part of the engine:
//! - Traversal direction (`Dir`)
//! - The labeled directed edge (`Arc`)
//! - Label filtering for adjacency queries (`LabelFilter`)
//! - Error types (`GraphError`, `GraphErrorKind`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Implement `Ord` when their parameters do, for use in ordered maps and sets
//! - Are immutable values with structural equality

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// =============================================================================
// DIRECTION
// =============================================================================

/// The direction of an arc with respect to a node.
///
/// `Out` follows arcs leaving a node, `In` follows arcs entering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Follow arcs that end at the node.
    In,
    /// Follow arcs that start at the node.
    Out,
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

// =============================================================================
// ARC
// =============================================================================

/// A labeled arc from `start` to `end`.
///
/// Two arcs are equal iff label, start and end are all equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Arc<K, L> {
    /// The label of the arc.
    pub label: L,
    /// The key of the node where the arc starts.
    pub start: K,
    /// The key of the node where the arc ends.
    pub end: K,
}

impl<K, L> Arc<K, L> {
    /// Create an arc with `label` from `start` to `end`.
    #[must_use]
    pub const fn new(label: L, start: K, end: K) -> Self {
        Self { label, start, end }
    }

    /// The endpoint reached by traversing this arc in direction `dir`:
    /// `end` when going `Out`, `start` when going `In`.
    #[must_use]
    pub const fn slot(&self, dir: Dir) -> &K {
        match dir {
            Dir::Out => &self.end,
            Dir::In => &self.start,
        }
    }
}

impl<K: fmt::Display, L: fmt::Display> fmt::Display for Arc<K, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {}", self.start, self.end, self.label)
    }
}

// =============================================================================
// LABEL FILTER
// =============================================================================

/// Which arc labels an adjacency or closure query follows.
#[derive(Debug)]
pub enum LabelFilter<'a, L> {
    /// Any label.
    Any,
    /// Exactly this label.
    Is(&'a L),
    /// Any label contained in the set.
    In(&'a BTreeSet<L>),
}

impl<L> Clone for LabelFilter<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for LabelFilter<'_, L> {}

impl<L: Ord> LabelFilter<'_, L> {
    /// `true` if an arc carrying `label` passes this filter.
    #[must_use]
    pub fn accepts(&self, label: &L) -> bool {
        match self {
            Self::Any => true,
            Self::Is(wanted) => *wanted == label,
            Self::In(set) => set.contains(label),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Precondition failures of graph operations.
///
/// - Fail fast: every violation surfaces immediately as a distinct variant
/// - No partial mutation: the graph the operation was called on is unaffected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError<K, L> {
    /// A node was described without a key.
    #[error("Key is null")]
    KeyIsNull,

    /// A node with this key is already present.
    #[error("Key already exists: {0:?}")]
    KeyExists(K),

    /// No node with this key is present.
    #[error("Key missing: {0:?}")]
    KeyMissing(K),

    /// `add_arc_after` could not find the sibling arc to insert after.
    #[error("The arcs out from key {start:?} with label {label:?} do not contain key {after:?}")]
    AfterKeyMissing { start: K, label: L, after: K },

    /// The node still has incident arcs and cannot be removed.
    #[error("Node {key:?} still has {} incident arc(s): {arcs:?}", .arcs.len())]
    NodeHasArcs { key: K, arcs: Vec<Arc<K, L>> },
}

/// The variant of a [`GraphError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphErrorKind {
    KeyIsNull,
    KeyExists,
    KeyMissing,
    AfterKeyMissing,
    NodeHasArcs,
}

impl<K, L> GraphError<K, L> {
    /// Which precondition failed.
    #[must_use]
    pub const fn kind(&self) -> GraphErrorKind {
        match self {
            Self::KeyIsNull => GraphErrorKind::KeyIsNull,
            Self::KeyExists(_) => GraphErrorKind::KeyExists,
            Self::KeyMissing(_) => GraphErrorKind::KeyMissing,
            Self::AfterKeyMissing { .. } => GraphErrorKind::AfterKeyMissing,
            Self::NodeHasArcs { .. } => GraphErrorKind::NodeHasArcs,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_follows_direction() {
        let arc = Arc::new("x", 1, 2);
        assert_eq!(*arc.slot(Dir::Out), 2);
        assert_eq!(*arc.slot(Dir::In), 1);
    }

    #[test]
    fn arcs_compare_structurally() {
        assert_eq!(Arc::new("x", "a", "b"), Arc::new("x", "a", "b"));
        assert_ne!(Arc::new("x", "a", "b"), Arc::new("y", "a", "b"));
        assert_ne!(Arc::new("x", "a", "b"), Arc::new("x", "b", "a"));
    }

    #[test]
    fn arc_display() {
        assert_eq!(Arc::new("mod", "A", "C").to_string(), "(A, C) mod");
    }

    #[test]
    fn label_filter_accepts() {
        let labels: BTreeSet<&str> = ["x", "y"].into_iter().collect();

        assert!(LabelFilter::Any.accepts(&"z"));
        assert!(LabelFilter::Is(&"x").accepts(&"x"));
        assert!(!LabelFilter::Is(&"x").accepts(&"y"));
        assert!(LabelFilter::In(&labels).accepts(&"y"));
        assert!(!LabelFilter::In(&labels).accepts(&"z"));
    }

    #[test]
    fn after_key_missing_message() {
        let err: GraphError<i32, &str> = GraphError::AfterKeyMissing {
            start: 1,
            label: "child",
            after: 3,
        };
        assert_eq!(
            err.to_string(),
            "The arcs out from key 1 with label \"child\" do not contain key 3"
        );
    }

    #[test]
    fn node_has_arcs_message_counts_arcs() {
        let err: GraphError<&str, &str> = GraphError::NodeHasArcs {
            key: "a",
            arcs: vec![Arc::new("x", "a", "b")],
        };
        assert!(err.to_string().contains("1 incident arc(s)"));
    }

    #[test]
    fn error_kind_drops_payload() {
        let missing: GraphError<&str, &str> = GraphError::KeyMissing("a");
        assert_eq!(missing.kind(), GraphErrorKind::KeyMissing);
        assert_eq!(
            GraphError::<&str, &str>::KeyIsNull.kind(),
            GraphErrorKind::KeyIsNull
        );
    }

    #[test]
    fn dir_display() {
        assert_eq!(Dir::In.to_string(), "in");
        assert_eq!(Dir::Out.to_string(), "out");
    }
}
