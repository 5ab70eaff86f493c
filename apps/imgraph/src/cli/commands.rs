//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Each command returns the text to print, so the caller decides where it goes.

use super::{CliError, ClosureMode};
use imgraph_core::{
    Arc, CycleFinder, Dir, DocumentFormat, Graph, GraphError, LabelFilter, formats,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The graph a document describes: string keys and labels, any JSON value as data.
pub type DocGraph = Graph<String, serde_json::Value, String>;

// =============================================================================
// PATH VALIDATION
// =============================================================================

/// Validate an input path.
///
/// Canonicalizes the path (resolving symlinks and "..") and ensures it names
/// an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, CliError> {
    let canonical = path.canonicalize().map_err(|e| {
        CliError::InvalidArgument(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CliError::InvalidArgument(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path: its parent must be an existing directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, CliError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CliError::InvalidArgument(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CliError::InvalidArgument("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// LOADING
// =============================================================================

/// Load the graph document at `path`.
///
/// With `format` of `None` the format follows the file extension.
pub fn load_graph(path: &Path, format: Option<DocumentFormat>) -> Result<DocGraph, CliError> {
    let format = match format {
        Some(f) => f,
        None => DocumentFormat::from_path(path)?,
    };
    let canonical = validate_file_path(path)?;
    let graph: DocGraph = formats::load(&canonical, Some(format))?;

    tracing::info!(
        path = %canonical.display(),
        nodes = graph.node_count(),
        arcs = graph.arc_count(),
        "loaded graph document"
    );
    Ok(graph)
}

// =============================================================================
// HELPERS
// =============================================================================

fn label_set(labels: &[String]) -> BTreeSet<String> {
    labels.iter().cloned().collect()
}

/// Any label when no labels were given, otherwise exactly those.
fn filter_for(labels: &BTreeSet<String>) -> LabelFilter<'_, String> {
    if labels.is_empty() {
        LabelFilter::Any
    } else {
        LabelFilter::In(labels)
    }
}

fn require_keys(graph: &DocGraph, keys: &[String]) -> Result<(), CliError> {
    match keys.iter().find(|k| !graph.contains_node_with_key(k)) {
        Some(missing) => {
            let err: GraphError<String, String> = GraphError::KeyMissing(missing.clone());
            Err(CliError::Document(err.into()))
        }
        None => Ok(()),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn format_arcs(arcs: &[Arc<String, String>]) -> String {
    arcs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Summary of a loaded graph.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub document: String,
    pub node_count: usize,
    pub arc_count: usize,
    pub roots: Vec<String>,
    pub leaves: Vec<String>,
    pub parts: usize,
    pub has_cycle: bool,
}

impl StatusReport {
    /// Gather the summary of `graph`, loaded from `document`.
    #[must_use]
    pub fn of(graph: &DocGraph, document: &Path) -> Self {
        Self {
            document: document.display().to_string(),
            node_count: graph.node_count(),
            arc_count: graph.arc_count(),
            roots: graph.roots(),
            leaves: graph.leaves(),
            parts: graph.partition().len(),
            has_cycle: graph.has_cycle(),
        }
    }
}

/// Show graph status.
pub fn cmd_status(graph: &DocGraph, document: &Path, json_mode: bool) -> Result<String, CliError> {
    let report = StatusReport::of(graph, document);

    if json_mode {
        return to_json(&report);
    }

    let mut out = String::new();
    out.push_str("imgraph Graph Status\n");
    out.push_str("====================\n");
    out.push_str(&format!("Document:  {}\n", report.document));
    out.push('\n');
    out.push_str(&format!("Nodes:     {}\n", report.node_count));
    out.push_str(&format!("Arcs:      {}\n", report.arc_count));
    out.push_str(&format!("Roots:     {}\n", report.roots.join(" ")));
    out.push_str(&format!("Leaves:    {}\n", report.leaves.join(" ")));
    out.push_str(&format!("Parts:     {}\n", report.parts));
    out.push_str(&format!("Has cycle: {}", report.has_cycle));
    Ok(out)
}

// =============================================================================
// RENDER COMMANDS
// =============================================================================

/// Draw the graph as an ASCII tree.
pub fn cmd_show(graph: &DocGraph, json_mode: bool) -> Result<String, CliError> {
    let tree = graph.show();

    if json_mode {
        return to_json(&serde_json::json!({ "lines": tree.lines() }));
    }
    Ok(tree.to_string())
}

/// Print the graph in GraphViz format.
#[must_use]
pub fn cmd_dot(graph: &DocGraph) -> String {
    graph.get_graphviz_graph()
}

/// List keys and arcs.
pub fn cmd_sets(graph: &DocGraph, json_mode: bool) -> Result<String, CliError> {
    if json_mode {
        let keys: Vec<&String> = graph.keys().collect();
        let arcs: Vec<&Arc<String, String>> = graph.arcs().collect();
        return to_json(&serde_json::json!({ "keys": keys, "arcs": arcs }));
    }
    Ok(graph.show_as_sets().to_string())
}

// =============================================================================
// QUERY COMMANDS
// =============================================================================

/// Neighbours of `key` one arc away.
pub fn cmd_connected(
    graph: &DocGraph,
    json_mode: bool,
    dir: Dir,
    labels: &[String],
    key: &str,
) -> Result<String, CliError> {
    let key = key.to_string();
    require_keys(graph, std::slice::from_ref(&key))?;

    let labels = label_set(labels);
    let connected = graph.get_connected(dir, filter_for(&labels), &key);
    tracing::debug!(%key, %dir, found = connected.len(), "connected");

    if json_mode {
        return to_json(&serde_json::json!({
            "key": key,
            "dir": dir,
            "connected": connected,
        }));
    }
    Ok(connected.join("\n"))
}

/// Closure of `keys` in the requested mode.
pub fn cmd_closure(
    graph: &DocGraph,
    json_mode: bool,
    dir: Dir,
    labels: &[String],
    keys: &[String],
    mode: ClosureMode,
) -> Result<String, CliError> {
    require_keys(graph, keys)?;

    let labels = label_set(labels);
    let filter = filter_for(&labels);

    let closure = match (mode, keys) {
        (ClosureMode::Exclusive, [key]) => graph.get_closure(dir, filter, key),
        (ClosureMode::Exclusive, _) => {
            return Err(CliError::InvalidArgument(format!(
                "exclusive closure takes exactly one key, got {}",
                keys.len()
            )));
        }
        (ClosureMode::Inclusive, _) => graph.get_inclusive_closure(dir, filter, keys),
        (ClosureMode::InOrder, _) => graph.get_in_order_closure(dir, filter, keys),
    };
    tracing::debug!(?mode, %dir, found = closure.len(), "closure");

    if json_mode {
        return to_json(&serde_json::json!({
            "keys": keys,
            "dir": dir,
            "closure": closure,
        }));
    }
    Ok(closure.join("\n"))
}

/// Every maximal path from `key`.
pub fn cmd_paths(
    graph: &DocGraph,
    json_mode: bool,
    dir: Dir,
    labels: &[String],
    key: &str,
) -> Result<String, CliError> {
    let key = key.to_string();
    require_keys(graph, std::slice::from_ref(&key))?;

    let labels = label_set(labels);
    let paths = graph.get_paths(dir, filter_for(&labels), &key);

    if json_mode {
        return to_json(&paths);
    }
    Ok(paths
        .iter()
        .map(|p| p.join(" -> "))
        .collect::<Vec<_>>()
        .join("\n"))
}

// =============================================================================
// CYCLE AND PRUNING COMMANDS
// =============================================================================

/// List every elementary cycle, or the graph with non-cycles pruned.
pub fn cmd_cycles(graph: &DocGraph, json_mode: bool, prune: bool) -> Result<String, CliError> {
    let finder = CycleFinder::new(graph);

    if prune {
        let pruned = finder.remove_non_cycles();
        tracing::info!(
            removed = graph.node_count() - pruned.node_count(),
            remaining = pruned.node_count(),
            "pruned non-cycles"
        );
        if json_mode {
            return Ok(formats::to_json_string(&pruned)?);
        }
        return Ok(pruned.show_as_sets().to_string());
    }

    let cycles = finder.all_cycles();
    tracing::info!(cycles = cycles.len(), "found cycles");

    if json_mode {
        return to_json(&cycles);
    }
    if cycles.is_empty() {
        return Ok("No cycles".to_string());
    }
    Ok(cycles
        .iter()
        .map(|c| format_arcs(c))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Restrict the graph to the in-order closure of `keys` over `labels`.
pub fn cmd_shrink(
    graph: &DocGraph,
    json_mode: bool,
    labels: &[String],
    keys: &[String],
) -> Result<String, CliError> {
    require_keys(graph, keys)?;

    let shrunk = graph.shrink_to_inclusive_closure_of(&label_set(labels), keys);

    if json_mode {
        return Ok(formats::to_json_string(&shrunk)?);
    }
    Ok(shrunk.show().to_string())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Export the graph as a JSON document, to `output` or as the returned text.
pub fn cmd_export(graph: &DocGraph, output: Option<&Path>) -> Result<String, CliError> {
    let json = formats::to_json_string(graph)?;

    let Some(output) = output else {
        return Ok(json);
    };

    let target = validate_output_path(output)?;
    std::fs::write(&target, json)?;
    tracing::info!(path = %target.display(), "exported graph document");

    Ok(format!(
        "Exported {} nodes and {} arcs to {}",
        graph.node_count(),
        graph.arc_count(),
        target.display()
    ))
}
