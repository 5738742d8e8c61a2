//! CLI command implementations
//!
//! Each subcommand is a thin wrapper: argument handling and console output
//! live here, the actual register and line sequences live in pixiprog-core.

pub mod lcd;
pub mod motor;
pub mod prog;
pub mod reg;
