//! The `clean` subcommand: remove transient build artifacts.

use std::path::PathBuf;

use crate::cli::args::CleanArgs;
use crate::config::BundleConfig;
use crate::error::Result;
use crate::orchestrator::clean;

/// Removes the output directory, the bundler's build tree, generated
/// spec files, and any extra configured or given paths.
///
/// Idempotent: missing paths are fine, and removal failures are printed
/// as warnings without failing the command.
pub async fn execute(args: CleanArgs) -> Result<i32> {
    let config = args
        .config
        .as_deref()
        .map(BundleConfig::load)
        .transpose()?;

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.build.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("dist"));
    let work_dir = args
        .work_dir
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.build.work_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."));

    let mut patterns = vec![
        output_dir.display().to_string(),
        work_dir.join("build").display().to_string(),
        work_dir.join("*.spec").display().to_string(),
    ];
    if let Some(config) = &config {
        patterns.extend(config.build.clean.iter().cloned());
    }
    patterns.extend(args.paths.iter().cloned());

    let outcome = clean::clean(&patterns).await?;
    println!("{}", outcome.message());
    Ok(0)
}
