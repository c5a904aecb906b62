//! FigureComposer Bundler - packaging orchestrator CLI.
//!
//! Builds standalone executables of the FigureComposer application for
//! Windows, macOS, and Linux by driving an external bundling tool, with
//! proper error handling and a per-step build report.

use std::process;

use figcomposer_bundler::cli;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
