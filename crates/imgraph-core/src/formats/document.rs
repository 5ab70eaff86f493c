//! # Graph Documents
//!
//! A serde description of a graph, readable from JSON or TOML.
//!
//! ```json
//! {
//!   "nodes": [ { "key": "A", "value": 1 }, { "key": "B" } ],
//!   "arcs":  [ { "label": "x", "start": "A", "end": "B", "placement": "last" } ]
//! }
//! ```
//!
//! Nodes are added in document order, then arcs in document order. An arc
//! with `after` is spliced in after the sibling arc to that key; otherwise
//! `placement` puts it first (the default) or last in its start node's
//! out-list.
//!
//! ## Security
//!
//! Size limits from [`crate::primitives`] are checked BEFORE parsing (file
//! size) and BEFORE building (entry counts).

use crate::{Graph, GraphError, GraphErrorKind, primitives};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Failures while reading, parsing or building a graph document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Document has too many {what}: {count} (max {max})")]
    TooManyEntries {
        what: &'static str,
        count: usize,
        max: usize,
    },

    /// The graph rejected an entry. `kind` names the failed precondition,
    /// `message` is the rendered [`GraphError`].
    #[error("Graph error: {message}")]
    Graph {
        kind: GraphErrorKind,
        message: String,
    },
}

impl<K: Debug, L: Debug> From<GraphError<K, L>> for DocumentError {
    fn from(err: GraphError<K, L>) -> Self {
        Self::Graph {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// FORMAT
// =============================================================================

/// The syntax of a graph document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// The format implied by the file extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(DocumentError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

/// Where a document arc goes in the out-list of its start node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcPlacement {
    #[default]
    First,
    Last,
}

/// A node entry. `key` is optional in the syntax so that its absence can be
/// reported as [`GraphError::KeyIsNull`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument<K, D> {
    pub key: Option<K>,
    #[serde(default)]
    pub value: D,
}

/// An arc entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcDocument<K, L> {
    pub label: L,
    pub start: K,
    pub end: K,
    #[serde(default)]
    pub placement: ArcPlacement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<K>,
}

/// A whole graph: nodes then arcs. A node without `value` gets `D::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de>, D: Deserialize<'de> + Default, L: Deserialize<'de>"))]
pub struct GraphDocument<K, D, L> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<NodeDocument<K, D>>,
    #[serde(default = "Vec::new")]
    pub arcs: Vec<ArcDocument<K, L>>,
}

impl<K, D, L> GraphDocument<K, D, L>
where
    K: Ord + Clone,
    D: Clone,
    L: Ord + Clone,
{
    /// Build the graph this document describes.
    ///
    /// Fails on the first entry the graph rejects: a node without a key
    /// (`KeyIsNull`), a repeated key (`KeyExists`), an arc endpoint that is
    /// not a node (`KeyMissing`) or an `after` sibling that is not there
    /// (`AfterKeyMissing`).
    pub fn into_graph(self) -> Result<Graph<K, D, L>, GraphError<K, L>> {
        let mut graph = Graph::empty();

        for node in self.nodes {
            let key = node.key.ok_or(GraphError::KeyIsNull)?;
            graph = graph.add_node(key, node.value)?;
        }

        for arc in self.arcs {
            graph = match (arc.after, arc.placement) {
                (Some(after), _) => graph.add_arc_after(arc.label, arc.start, arc.end, after)?,
                (None, ArcPlacement::First) => graph.add_arc(arc.label, arc.start, arc.end)?,
                (None, ArcPlacement::Last) => {
                    graph.add_arc_as_last(arc.label, arc.start, arc.end)?
                }
            };
        }

        tracing::debug!(
            nodes = graph.node_count(),
            arcs = graph.arc_count(),
            "built graph from document"
        );
        Ok(graph)
    }

    fn check_limits(&self) -> Result<(), DocumentError> {
        if self.nodes.len() > primitives::MAX_DOCUMENT_NODES {
            return Err(DocumentError::TooManyEntries {
                what: "nodes",
                count: self.nodes.len(),
                max: primitives::MAX_DOCUMENT_NODES,
            });
        }
        if self.arcs.len() > primitives::MAX_DOCUMENT_ARCS {
            return Err(DocumentError::TooManyEntries {
                what: "arcs",
                count: self.arcs.len(),
                max: primitives::MAX_DOCUMENT_ARCS,
            });
        }
        Ok(())
    }
}

/// Export: nodes in key order, arcs grouped by start key in out-list order,
/// each placed last so that reloading rebuilds the same out-lists.
impl<K, D, L> From<&Graph<K, D, L>> for GraphDocument<K, D, L>
where
    K: Ord + Clone,
    D: Clone,
    L: Ord + Clone,
{
    fn from(graph: &Graph<K, D, L>) -> Self {
        Self {
            nodes: graph
                .values
                .iter()
                .map(|(k, v)| NodeDocument {
                    key: Some(k.clone()),
                    value: v.clone(),
                })
                .collect(),
            arcs: graph
                .arcs()
                .map(|a| ArcDocument {
                    label: a.label.clone(),
                    start: a.start.clone(),
                    end: a.end.clone(),
                    placement: ArcPlacement::Last,
                    after: None,
                })
                .collect(),
        }
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse a JSON graph document and build the graph.
pub fn from_json_str<K, D, L>(text: &str) -> Result<Graph<K, D, L>, DocumentError>
where
    K: Ord + Clone + Debug + DeserializeOwned,
    D: Clone + Default + DeserializeOwned,
    L: Ord + Clone + Debug + DeserializeOwned,
{
    check_size(text.len() as u64)?;
    let doc: GraphDocument<K, D, L> = serde_json::from_str(text)?;
    doc.check_limits()?;
    Ok(doc.into_graph()?)
}

/// Parse a TOML graph document and build the graph.
///
/// TOML uses arrays of tables: `[[nodes]]` and `[[arcs]]`.
pub fn from_toml_str<K, D, L>(text: &str) -> Result<Graph<K, D, L>, DocumentError>
where
    K: Ord + Clone + Debug + DeserializeOwned,
    D: Clone + Default + DeserializeOwned,
    L: Ord + Clone + Debug + DeserializeOwned,
{
    check_size(text.len() as u64)?;
    let doc: GraphDocument<K, D, L> = toml::from_str(text)?;
    doc.check_limits()?;
    Ok(doc.into_graph()?)
}

/// Read and build the graph document at `path`.
///
/// `format` of `None` picks the format from the file extension. The file
/// size is checked before the file is read.
pub fn load<K, D, L>(
    path: &Path,
    format: Option<DocumentFormat>,
) -> Result<Graph<K, D, L>, DocumentError>
where
    K: Ord + Clone + Debug + DeserializeOwned,
    D: Clone + Default + DeserializeOwned,
    L: Ord + Clone + Debug + DeserializeOwned,
{
    let format = match format {
        Some(f) => f,
        None => DocumentFormat::from_path(path)?,
    };
    check_size(std::fs::metadata(path)?.len())?;

    let text = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), ?format, bytes = text.len(), "loading graph document");

    match format {
        DocumentFormat::Json => from_json_str(&text),
        DocumentFormat::Toml => from_toml_str(&text),
    }
}

/// The graph as a pretty-printed JSON document.
pub fn to_json_string<K, D, L>(graph: &Graph<K, D, L>) -> Result<String, DocumentError>
where
    K: Ord + Clone + Serialize,
    D: Clone + Serialize,
    L: Ord + Clone + Serialize,
{
    Ok(serde_json::to_string_pretty(&GraphDocument::from(graph))?)
}

fn check_size(size: u64) -> Result<(), DocumentError> {
    if size > primitives::MAX_DOCUMENT_SIZE {
        return Err(DocumentError::TooLarge {
            size,
            max: primitives::MAX_DOCUMENT_SIZE,
        });
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
