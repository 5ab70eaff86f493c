//! # Formats
//!
//! Serialized forms of a graph read and written outside the engine.
//!
//! - `document`: JSON / TOML graph documents (nodes + ordered arcs)
//!
//! Rendering for humans (ASCII tree, GraphViz) lives in `render`.

pub mod document;

pub use document::{
    ArcDocument, ArcPlacement, DocumentError, DocumentFormat, GraphDocument, NodeDocument,
    from_json_str, from_toml_str, load, to_json_string,
};
