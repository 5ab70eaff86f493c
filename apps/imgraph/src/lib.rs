//! # imgraph
//!
//! Command-line front end for `imgraph-core`.
//!
//! The binary in `main.rs` only parses arguments, sets up logging and prints;
//! everything it runs lives in [`cli`] so it can be driven from tests.

pub mod cli;
