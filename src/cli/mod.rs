//! Command-line interface
//!
//! Argument parsing for the `metahash` binary.

pub mod commands;

pub use commands::{Command, Opt};
