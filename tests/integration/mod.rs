//! End-to-end tests over the session, the persistent store, and the CLI

pub mod fakes;

mod cli_commands;
mod persistence;
mod session_flow;
