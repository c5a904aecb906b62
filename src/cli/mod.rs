//! Command line interface for the packaging orchestrator.
//!
//! Argument parsing, command dispatch, and Ctrl-C wiring live here; the
//! actual pipeline is in [`crate::orchestrator`].

mod args;
pub mod commands;

pub use args::{Args, BuildArgs, CleanArgs, Command};

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    match args.command {
        Command::Build(build) => commands::build::execute(build).await,
        Command::Clean(clean) => commands::clean::execute(clean).await,
    }
}
