//! Dependency manifest and installer.
//!
//! Each dependency is probed through the runtime's package inspector and
//! installed with its own declared command when absent. Installation is
//! attempted at most twice per dependency; a second failure aborts the
//! run rather than looping against a broken network or mirror.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::orchestrator::error::{Error, Result};
use crate::orchestrator::settings::lenient_version;
use crate::orchestrator::utils::proc;

/// One library the packaged application needs.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Dependency {
    /// Package identifier, unique within a manifest.
    pub id: String,

    /// Minimum acceptable installed version. Anything older is
    /// reinstalled.
    #[serde(default)]
    pub min_version: Option<String>,

    /// Command that installs the package, e.g.
    /// `python3 -m pip install PyQt5`.
    pub install: String,
}

/// Rejects manifests with duplicate identifiers.
pub fn validate_manifest(deps: &[Dependency]) -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();
    for dep in deps {
        if !seen.insert(dep.id.as_str()) {
            return Err(Error::InvalidTarget(format!(
                "duplicate dependency identifier {:?} in manifest",
                dep.id
            )));
        }
    }
    Ok(())
}

/// Ensures every declared dependency is present, installing missing ones.
///
/// Returns a one-line summary for the step message. Installation runs in
/// this run's environment only; concurrent runs each install for
/// themselves instead of coordinating over a shared cache.
pub async fn ensure(
    runtime: &str,
    deps: &[Dependency],
    cancel: &CancellationToken,
) -> Result<String> {
    let mut installed = 0usize;

    for dep in deps {
        if is_present(runtime, dep, cancel).await? {
            log::debug!("dependency {} already present", dep.id);
            continue;
        }

        // One install, one retry, then give up on this run.
        let mut last_failure = String::new();
        let mut ok = false;
        for attempt in 1..=2 {
            log::info!("installing {} (attempt {attempt})", dep.id);
            match install(dep, cancel).await? {
                None => {
                    if is_present(runtime, dep, cancel).await? {
                        ok = true;
                        break;
                    }
                    last_failure =
                        format!("install command succeeded but {} is still absent", dep.id);
                }
                Some(failure) => last_failure = failure,
            }
        }

        if !ok {
            return Err(Error::DependencyInstallFailed {
                identifier: dep.id.clone(),
                detail: last_failure,
            });
        }
        installed += 1;
    }

    Ok(format!(
        "{} dependencies present ({installed} installed)",
        deps.len()
    ))
}

/// Probes one dependency through `<runtime> -m pip show <id>`.
///
/// A dependency older than its declared floor counts as absent.
async fn is_present(runtime: &str, dep: &Dependency, cancel: &CancellationToken) -> Result<bool> {
    let captured = proc::run_captured(
        runtime,
        ["-m", "pip", "show", dep.id.as_str()],
        None,
        cancel,
    )
    .await?;

    let status = captured.wait.completed()?;
    if !status.success() {
        return Ok(false);
    }

    if let Some(floor) = &dep.min_version {
        let floor = lenient_version(floor).map_err(Error::InvalidTarget)?;
        let found = captured
            .output
            .iter()
            .find_map(|line| line.strip_prefix("Version:"))
            .and_then(|v| lenient_version(v).ok());
        match found {
            Some(found) if found >= floor => {}
            _ => return Ok(false),
        }
    }

    Ok(true)
}

/// Runs a dependency's install command once.
///
/// Returns `Ok(None)` on success, `Ok(Some(reason))` when the command
/// failed in a retryable way. A command that cannot even be spawned is
/// retryable too; only cancellation aborts immediately.
async fn install(dep: &Dependency, cancel: &CancellationToken) -> Result<Option<String>> {
    let mut words = dep.install.split_whitespace();
    let program = words.next().ok_or_else(|| {
        Error::InvalidTarget(format!("dependency {:?} has an empty install command", dep.id))
    })?;

    let captured = match proc::run_captured(program, words, None, cancel).await {
        Ok(captured) => captured,
        Err(Error::CommandFailed { command, error }) => {
            return Ok(Some(format!("could not run {command}: {error}")));
        }
        Err(e) => return Err(e),
    };
    let status = captured.wait.completed()?;

    if status.success() {
        Ok(None)
    } else {
        Ok(Some(format!(
            "`{}` exited with {}: {}",
            dep.install,
            status,
            captured.tail(20)
        )))
    }
}
