//! # imgraph CLI Module
//!
//! This module implements the CLI interface for imgraph.
//!
//! ## Available Commands
//!
//! - `status` - Show counts, roots, leaves, reachability groups and whether a cycle is reachable
//! - `show` - Draw the graph as an ASCII tree
//! - `dot` - Print the graph in GraphViz format
//! - `sets` - List keys and arcs
//! - `connected` - Neighbours of a node
//! - `closure` - Everything reachable from one or more nodes
//! - `paths` - Every maximal path from a node
//! - `cycles` - Enumerate cycles, or prune everything that is not on one
//! - `shrink` - Restrict the graph to a labelled closure
//! - `export` - Write the graph as a JSON document

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use imgraph_core::{Dir, DocumentError, DocumentFormat};
use std::path::PathBuf;
use thiserror::Error;

pub use commands::*;

// =============================================================================
// ERRORS
// =============================================================================

/// Failures of a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// imgraph - immutable labeled directed graphs
///
/// Loads a graph document (JSON or TOML) and runs queries against it.
/// The document is never modified; commands that derive a new graph print it.
#[derive(Parser, Debug)]
#[command(name = "imgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the graph document
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Document format; `auto` picks it from the file extension
    #[arg(long, global = true, value_enum, default_value_t = FormatArg::Auto)]
    pub format: FormatArg,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Document format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Auto,
    Json,
    Toml,
}

impl FormatArg {
    fn document_format(self) -> Option<DocumentFormat> {
        match self {
            Self::Auto => None,
            Self::Json => Some(DocumentFormat::Json),
            Self::Toml => Some(DocumentFormat::Toml),
        }
    }
}

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirArg {
    In,
    Out,
}

impl From<DirArg> for Dir {
    fn from(dir: DirArg) -> Self {
        match dir {
            DirArg::In => Self::In,
            DirArg::Out => Self::Out,
        }
    }
}

/// Which closure to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClosureMode {
    /// Reachable keys, the start key excluded (single start key)
    Exclusive,
    /// Reachable keys, start keys included
    Inclusive,
    /// Inclusive, ordered so no key comes after a key it reaches
    InOrder,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show graph status
    Status,

    /// Draw the graph as an ASCII tree
    Show,

    /// Print the graph in GraphViz dot format
    Dot,

    /// List the keys, then one arc per line
    Sets,

    /// Neighbours of a node reached by one arc
    Connected {
        /// Direction to follow
        #[arg(short, long, value_enum, default_value_t = DirArg::Out)]
        dir: DirArg,

        /// Labels to follow (comma-separated); all labels when omitted
        #[arg(short, long, value_delimiter = ',')]
        labels: Vec<String>,

        /// Node key
        #[arg(short, long)]
        key: String,
    },

    /// Keys reachable from the given nodes
    Closure {
        /// Direction to follow
        #[arg(short, long, value_enum, default_value_t = DirArg::Out)]
        dir: DirArg,

        /// Labels to follow (comma-separated); all labels when omitted
        #[arg(short, long, value_delimiter = ',')]
        labels: Vec<String>,

        /// Start keys (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        keys: Vec<String>,

        /// Closure flavour
        #[arg(short, long, value_enum, default_value_t = ClosureMode::Exclusive)]
        mode: ClosureMode,
    },

    /// Every maximal path from a node
    Paths {
        /// Direction to follow
        #[arg(short, long, value_enum, default_value_t = DirArg::Out)]
        dir: DirArg,

        /// Labels to follow (comma-separated); all labels when omitted
        #[arg(short, long, value_delimiter = ',')]
        labels: Vec<String>,

        /// Node key
        #[arg(short, long)]
        key: String,
    },

    /// Enumerate elementary cycles
    Cycles {
        /// Instead of listing cycles, print the graph with every node that is
        /// not on or between cycles removed
        #[arg(short, long)]
        prune: bool,
    },

    /// Keep only the in-order closure of the keys over outgoing arcs with the labels
    Shrink {
        /// Labels to follow (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        labels: Vec<String>,

        /// Start keys (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        keys: Vec<String>,
    },

    /// Export the graph as a JSON document
    Export {
        /// Output file path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments, returning the text to print.
pub fn execute(cli: Cli) -> Result<String, CliError> {
    let json_mode = cli.json_mode;
    let file = cli
        .file
        .ok_or_else(|| CliError::InvalidArgument("no graph document given (use --file)".into()))?;
    let graph = load_graph(&file, cli.format.document_format())?;

    match cli.command {
        Some(Commands::Status) | None => cmd_status(&graph, &file, json_mode),
        Some(Commands::Show) => cmd_show(&graph, json_mode),
        Some(Commands::Dot) => Ok(cmd_dot(&graph)),
        Some(Commands::Sets) => cmd_sets(&graph, json_mode),
        Some(Commands::Connected { dir, labels, key }) => {
            cmd_connected(&graph, json_mode, dir.into(), &labels, &key)
        }
        Some(Commands::Closure {
            dir,
            labels,
            keys,
            mode,
        }) => cmd_closure(&graph, json_mode, dir.into(), &labels, &keys, mode),
        Some(Commands::Paths { dir, labels, key }) => {
            cmd_paths(&graph, json_mode, dir.into(), &labels, &key)
        }
        Some(Commands::Cycles { prune }) => cmd_cycles(&graph, json_mode, prune),
        Some(Commands::Shrink { labels, keys }) => cmd_shrink(&graph, json_mode, &labels, &keys),
        Some(Commands::Export { output }) => cmd_export(&graph, output.as_deref()),
    }
}
