//! # imgraph-core
//!
//! The immutable graph engine for imgraph - THE LOGIC.
//!
//! A [`Graph`] is a directed, labeled graph whose nodes are identified by
//! ordered keys and carry arbitrary data. Every operation that changes the
//! graph returns a new one; the original stays valid and unchanged, and the
//! two share structure.
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network dependencies
//! - Deterministic: ordered persistent maps, so every listing is in key order
//!   or in the caller-controlled order of an out-list
//! - Read-only projections (closures, cycles, rendering) never mutate
//!
//! ## Example
//!
//! ```
//! use imgraph_core::{CycleFinder, Dir, Graph, LabelFilter};
//!
//! let g: Graph<&str, (), &str> = Graph::empty()
//!     .add_node("a", ())
//!     .and_then(|g| g.add_node("b", ()))
//!     .and_then(|g| g.add_arc("x", "a", "b"))
//!     .and_then(|g| g.add_arc("y", "b", "a"))
//!     .unwrap();
//!
//! assert_eq!(g.get_closure(Dir::Out, LabelFilter::Any, &"a"), vec!["b"]);
//! assert_eq!(CycleFinder::new(&g).all_cycles().len(), 1);
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod cycles;
pub mod formats;
pub mod graph;
pub mod primitives;
pub mod query;
pub mod render;
pub mod textbox;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Arc, Dir, GraphError, GraphErrorKind, LabelFilter};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use cycles::{Cycle, CycleFinder};
pub use graph::Graph;
pub use textbox::TextBox;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{
    ArcDocument, ArcPlacement, DocumentError, DocumentFormat, GraphDocument, NodeDocument,
};
