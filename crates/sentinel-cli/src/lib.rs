//! Sentinel CLI library.
//!
//! Argument types and output helpers shared by the `sentinel-cli` binary.
//! Subcommand handlers live in the binary's `commands` module.

pub mod args;
pub mod output;
