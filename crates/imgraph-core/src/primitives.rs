//! # Primitives
//!
//! Fixed limits applied when graphs are read from outside the process.
//! The graph engine itself places no bound on size; these only guard the
//! document loader against oversized or malformed input.

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum size of a graph document on disk or in memory (64 MB).
///
/// Checked BEFORE the document is parsed.
pub const MAX_DOCUMENT_SIZE: u64 = 64 * 1024 * 1024;

/// Maximum number of node entries in a single graph document.
pub const MAX_DOCUMENT_NODES: usize = 1_000_000;

/// Maximum number of arc entries in a single graph document.
pub const MAX_DOCUMENT_ARCS: usize = 4_000_000;
