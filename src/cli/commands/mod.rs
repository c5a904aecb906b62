//! Command execution functions for the CLI subcommands.

pub mod build;
pub mod clean;
