//! Tooling
//!
//! Command-line front end and its text formatting.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Collaborators, Commands};
