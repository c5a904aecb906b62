//! Platform-specific finishing after the artifact exists.
//!
//! Everything here is best-effort: the artifact is already usable, so a
//! failed auxiliary copy or attribute change is recorded as a warning
//! and the build stays green.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::orchestrator::error::{Error, Result};
use crate::orchestrator::settings::{PackageMode, Platform, Settings};
use crate::orchestrator::utils::{fs, proc};

/// Copies auxiliary files next to the artifact and applies the target
/// platform's finishing actions.
///
/// macOS artifacts get the quarantine attribute cleared recursively so
/// the OS does not block first launch; macOS and Linux artifacts get the
/// executable bit; Windows needs nothing extra.
pub async fn finish(
    settings: &Settings,
    artifact: &Path,
    cancel: &CancellationToken,
) -> Result<String> {
    let target = settings.target();
    let mut actions: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    // Auxiliary files land in the directory containing the artifact.
    let dest_dir = artifact.parent().unwrap_or(artifact);
    let mut copied = 0usize;
    for aux in &target.aux_files {
        let file_name = match aux.file_name() {
            Some(name) => name,
            None => {
                warn(&mut warnings, format!("auxiliary path {} has no file name", aux.display()));
                continue;
            }
        };
        match fs::copy_file(aux, &dest_dir.join(file_name)).await {
            Ok(()) => copied += 1,
            Err(e) => warn(
                &mut warnings,
                format!("copying auxiliary file {}: {e}", aux.display()),
            ),
        }
    }
    if copied > 0 {
        actions.push(format!("copied {copied} auxiliary file(s)"));
    }

    if target.platform == Platform::Macos {
        match clear_quarantine(settings, artifact, cancel).await {
            Ok(()) => actions.push("cleared quarantine attribute".into()),
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => warn(&mut warnings, format!("clearing quarantine: {e}")),
        }
    }

    if matches!(target.platform, Platform::Macos | Platform::Linux) {
        // One-dir bundles launch through the binary inside the directory.
        let launcher = match target.mode {
            PackageMode::OneFile => artifact.to_path_buf(),
            PackageMode::OneDir => artifact.join(&target.name),
        };
        match fs::set_executable(&launcher).await {
            Ok(()) => actions.push("set executable permission".into()),
            Err(e) => warn(
                &mut warnings,
                format!("setting executable permission on {}: {e}", launcher.display()),
            ),
        }
    }

    let mut message = if actions.is_empty() {
        "nothing to do".to_string()
    } else {
        actions.join("; ")
    };
    if !warnings.is_empty() {
        message.push_str("; ");
        message.push_str(&warnings.join("; "));
    }
    Ok(message)
}

/// Clears the extended quarantine attribute recursively.
async fn clear_quarantine(
    settings: &Settings,
    artifact: &Path,
    cancel: &CancellationToken,
) -> Result<()> {
    let tool = &settings.tools().quarantine_tool;
    let captured = proc::run_captured(
        tool,
        ["-cr".to_string(), artifact.display().to_string()],
        None,
        cancel,
    )
    .await?;
    let status = captured.wait.completed()?;
    if !status.success() {
        return Err(Error::PostProcessWarning {
            detail: format!("{tool} exited with {status}: {}", captured.tail(5)),
        });
    }
    Ok(())
}

fn warn(warnings: &mut Vec<String>, detail: String) {
    let warning = Error::PostProcessWarning { detail };
    log::warn!("{warning}");
    warnings.push(warning.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::settings::{BuildTarget, SettingsBuilder};
    use std::collections::BTreeSet;

    fn linux_settings(dir: &Path, aux: Vec<std::path::PathBuf>) -> Settings {
        let entry = dir.join("gui.py");
        std::fs::write(&entry, "").unwrap();
        SettingsBuilder::new()
            .target(BuildTarget {
                platform: Platform::Linux,
                mode: PackageMode::OneFile,
                windowed: false,
                name: "FigureComposer".into(),
                icon: None,
                entry,
                data_files: Vec::new(),
                hidden_imports: BTreeSet::new(),
                aux_files: aux,
            })
            .output_dir(dir.join("dist"))
            .work_dir(dir)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn aux_copy_failure_is_a_warning_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("dist/FigureComposer");
        tokio::fs::create_dir_all(artifact.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&artifact, b"bin").await.unwrap();

        let settings = linux_settings(dir.path(), vec![dir.path().join("missing.json")]);
        let cancel = CancellationToken::new();
        let message = finish(&settings, &artifact, &cancel).await.unwrap();
        assert!(message.contains("post-processing"));
        assert!(message.contains("missing.json"));
    }

    #[tokio::test]
    async fn aux_files_land_next_to_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("dist/FigureComposer");
        tokio::fs::create_dir_all(artifact.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&artifact, b"bin").await.unwrap();
        let aux = dir.path().join("layout_defaults.json");
        tokio::fs::write(&aux, b"{}").await.unwrap();

        let settings = linux_settings(dir.path(), vec![aux]);
        let cancel = CancellationToken::new();
        let message = finish(&settings, &artifact, &cancel).await.unwrap();
        assert!(message.contains("copied 1 auxiliary file"));
        assert!(dir.path().join("dist/layout_defaults.json").is_file());
    }
}
