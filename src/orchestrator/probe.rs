//! Environment probing: runtime version and bundling tool availability.
//!
//! Read-only inspection; no retries. Every failure here needs a human to
//! install something, and the error message says exactly what.

use semver::Version;

use crate::orchestrator::error::{Error, Result};
use crate::orchestrator::settings::{ToolSettings, lenient_version};

/// Checks that the runtime and the bundling tool are usable.
///
/// Verifies the runtime program resolves and reports a version at or
/// above the configured floor, and that the bundling tool resolves on
/// PATH. Returns a one-line summary for the step message.
pub async fn probe(tools: &ToolSettings) -> Result<String> {
    let runtime_path = which::which(&tools.runtime).map_err(|e| Error::EnvironmentMissing {
        runtime: tools.runtime.clone(),
        detail: format!(
            "{e}. Install the runtime and make sure `{}` is on PATH",
            tools.runtime
        ),
    })?;

    let output = tokio::process::Command::new(&runtime_path)
        .arg("--version")
        .output()
        .await
        .map_err(|error| Error::CommandFailed {
            command: format!("{} --version", tools.runtime),
            error,
        })?;

    // Some runtimes print the version banner on stderr.
    let banner = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).into_owned()
    } else {
        String::from_utf8_lossy(&output.stdout).into_owned()
    };

    let version = parse_version_banner(&banner).ok_or_else(|| Error::EnvironmentMissing {
        runtime: tools.runtime.clone(),
        detail: format!("could not parse version from {banner:?}"),
    })?;

    if version < tools.runtime_min_version {
        return Err(Error::VersionTooOld {
            runtime: tools.runtime.clone(),
            found: version.to_string(),
            required: tools.runtime_min_version.to_string(),
        });
    }

    let bundler_path = which::which(&tools.bundler).map_err(|e| Error::ToolNotFound {
        tool: tools.bundler.clone(),
        detail: format!(
            "{e}. Install it with `{} -m pip install {}`",
            tools.runtime, tools.bundler
        ),
    })?;

    log::debug!(
        "probe: {} {} at {}, {} at {}",
        tools.runtime,
        version,
        runtime_path.display(),
        tools.bundler,
        bundler_path.display()
    );

    Ok(format!(
        "{} {} and {} found",
        tools.runtime, version, tools.bundler
    ))
}

/// Extracts a version from a banner like "Python 3.11.4".
///
/// Takes the first whitespace-separated token that starts with a digit
/// and parses it leniently, so "3.11" works too.
fn parse_version_banner(banner: &str) -> Option<Version> {
    banner
        .split_whitespace()
        .find(|tok| tok.starts_with(|c: char| c.is_ascii_digit()))
        .and_then(|tok| {
            // Strip trailing qualifiers like "3.13.0rc1".
            let numeric: String = tok
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            lenient_version(&numeric).ok()
        })
}
