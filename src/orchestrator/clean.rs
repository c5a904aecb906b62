//! Workspace cleaning: removal of stale build artifacts.
//!
//! Removal is idempotent and best-effort. A path that resists removal
//! (held open by another process, permissions) becomes a warning, not a
//! failure: the next build step overwrites stale files anyway.

use std::path::PathBuf;

use crate::orchestrator::error::{Error, Result};
use crate::orchestrator::utils::fs;

/// Result of a clean pass.
#[derive(Debug, Default)]
pub struct CleanOutcome {
    /// How many paths were actually removed.
    pub removed: usize,
    /// Non-fatal removal failures, one message per path.
    pub warnings: Vec<String>,
}

impl CleanOutcome {
    /// One-line summary for the step message.
    pub fn message(&self) -> String {
        if self.warnings.is_empty() {
            format!("removed {} stale path(s)", self.removed)
        } else {
            format!(
                "removed {} stale path(s); {}",
                self.removed,
                self.warnings.join("; ")
            )
        }
    }
}

/// Removes each path or glob pattern if present.
///
/// Absence of a path is not an error, so running clean twice in a row
/// always succeeds and leaves the workspace in the same state.
pub async fn clean<I, S>(patterns: I) -> Result<CleanOutcome>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut outcome = CleanOutcome::default();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        for path in expand(pattern)? {
            match fs::remove_path(&path).await {
                Ok(true) => {
                    log::debug!("removed {}", path.display());
                    outcome.removed += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    let warning = Error::CleanupWarning {
                        path: path.clone(),
                        detail: e.to_string(),
                    };
                    log::warn!("{warning}");
                    outcome.warnings.push(warning.to_string());
                }
            }
        }
    }

    Ok(outcome)
}

/// Expands a clean specification into concrete paths.
///
/// Specifications containing glob metacharacters go through pattern
/// matching; plain paths pass through untouched so a nonexistent literal
/// path still reaches the idempotent removal.
fn expand(pattern: &str) -> Result<Vec<PathBuf>> {
    if pattern.contains(['*', '?', '[']) {
        Ok(glob::glob(pattern)?
            .collect::<std::result::Result<Vec<_>, _>>()?)
    } else {
        Ok(vec![PathBuf::from(pattern)])
    }
}
