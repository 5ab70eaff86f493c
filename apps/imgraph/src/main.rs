//! # imgraph
//!
//! The command-line binary for the imgraph immutable graph engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/imgraph (THE BINARY)          │
//! │                                               │
//! │   ┌──────────────┐      ┌─────────────────┐   │
//! │   │     CLI      │      │ graph documents │   │
//! │   │   (clap)     │─────▶│  (JSON / TOML)  │   │
//! │   └──────┬───────┘      └────────┬────────┘   │
//! │          └────────────┬──────────┘            │
//! │                       ▼                       │
//! │               ┌──────────────┐                │
//! │               │ imgraph-core │                │
//! │               │ (THE LOGIC)  │                │
//! │               └──────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! imgraph -f graph.json status
//! imgraph -f graph.toml show
//! imgraph -f graph.json closure --keys A --labels mod,art --mode in-order
//! imgraph -f graph.json cycles --prune --json-mode
//! ```

use clap::Parser;
use imgraph::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // IMGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("IMGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "imgraph=debug,imgraph_core=debug"
    } else {
        "imgraph=info,imgraph_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so stdout carries only command output.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    match cli::execute(cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
