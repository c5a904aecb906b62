//! Packager invocation: building the bundler command line and running it.
//!
//! The option set is validated before anything is spawned; a target with
//! a missing icon or entry script never reaches the subprocess stage.
//! Bundler failures are deterministic for a given input, so a non-zero
//! exit is fatal and never retried.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::orchestrator::error::{Error, Result};
use crate::orchestrator::settings::{PackageMode, Platform, Settings};
use crate::orchestrator::utils::proc::{self, Wait};

/// Lines of captured bundler output kept in a failure message.
const DIAGNOSTIC_TAIL: usize = 40;

/// Validates the target against the disk and runs the bundling tool.
///
/// Returns the artifact path and a one-line summary on success.
pub async fn invoke(
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<(PathBuf, String)> {
    let args = build_arguments(settings)?;

    let bundler = &settings.tools().bundler;
    log::info!(
        "running {} for {}",
        bundler,
        settings.target().label()
    );
    log::debug!("{} {}", bundler, args.join(" "));

    let captured =
        proc::run_captured(bundler, &args, Some(settings.timeout()), cancel).await?;

    let status = match captured.wait {
        Wait::Completed(status) => status,
        Wait::TimedOut => {
            return Err(Error::PackagingTimeout {
                limit_secs: settings.timeout().as_secs(),
            });
        }
        Wait::Cancelled => return Err(Error::Cancelled),
    };

    if !status.success() {
        return Err(Error::PackagingFailed {
            detail: format!("{bundler} exited with {status}: {}", captured.tail(DIAGNOSTIC_TAIL)),
        });
    }

    let artifact = settings.artifact_path();
    let present = match settings.target().mode {
        PackageMode::OneFile => artifact.is_file(),
        PackageMode::OneDir => artifact.is_dir(),
    };
    if !present {
        return Err(Error::PackagingFailed {
            detail: format!(
                "{bundler} exited successfully but no artifact exists at {}",
                artifact.display()
            ),
        });
    }

    log::info!("✓ created artifact: {}", artifact.display());
    Ok((
        artifact.clone(),
        format!("artifact at {}", artifact.display()),
    ))
}

/// Builds the bundler argument vector from the target.
///
/// Checks disk-dependent invariants first so validation failures never
/// spawn a partial invocation.
fn build_arguments(settings: &Settings) -> Result<Vec<String>> {
    let target = settings.target();
    target.validate()?;

    if !target.entry.is_file() {
        return Err(Error::InvalidTarget(format!(
            "entry script {} does not exist",
            target.entry.display()
        )));
    }

    // Linux ignores icons entirely; elsewhere a declared icon must exist.
    let icon = match (target.platform, &target.icon) {
        (Platform::Linux, _) | (_, None) => None,
        (_, Some(icon)) => {
            if !icon.is_file() {
                return Err(Error::InvalidTarget(format!(
                    "icon {} does not exist",
                    icon.display()
                )));
            }
            Some(icon)
        }
    };

    let mut args = vec![
        "--noconfirm".to_string(),
        "--name".to_string(),
        target.name.clone(),
        target.mode.bundler_flag().to_string(),
        if target.windowed {
            "--windowed".to_string()
        } else {
            "--console".to_string()
        },
        "--distpath".to_string(),
        settings.output_dir().display().to_string(),
        "--workpath".to_string(),
        settings.work_dir().join("build").display().to_string(),
        "--specpath".to_string(),
        settings.work_dir().display().to_string(),
    ];

    if let Some(icon) = icon {
        args.push("--icon".to_string());
        args.push(icon.display().to_string());
    }

    for data_file in &target.data_files {
        args.push("--add-data".to_string());
        args.push(data_file.to_argument(target.platform));
    }

    for import in &target.hidden_imports {
        args.push("--hidden-import".to_string());
        args.push(import.clone());
    }

    args.push(target.entry.display().to_string());
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::settings::{BuildTarget, DataFile, SettingsBuilder};
    use std::collections::BTreeSet;

    fn settings_for(target: BuildTarget, dir: &std::path::Path) -> Settings {
        SettingsBuilder::new()
            .target(target)
            .output_dir(dir.join("dist"))
            .work_dir(dir)
            .build()
            .unwrap()
    }

    fn target_with_entry(dir: &std::path::Path) -> BuildTarget {
        let entry = dir.join("gui.py");
        std::fs::write(&entry, "print('hi')").unwrap();
        BuildTarget {
            platform: Platform::Linux,
            mode: PackageMode::OneFile,
            windowed: true,
            name: "FigureComposer".into(),
            icon: None,
            entry,
            data_files: vec![DataFile::new("layout_defaults.json", ".")],
            hidden_imports: BTreeSet::from(["PyQt5.sip".to_string()]),
            aux_files: Vec::new(),
        }
    }

    #[test]
    fn argument_vector_covers_the_option_set() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(target_with_entry(dir.path()), dir.path());
        let args = build_arguments(&settings).unwrap();

        assert!(args.contains(&"--onefile".to_string()));
        assert!(args.contains(&"--windowed".to_string()));
        assert!(args.contains(&"layout_defaults.json:.".to_string()));
        assert!(args.contains(&"PyQt5.sip".to_string()));
        // Entry script is the trailing positional argument.
        assert_eq!(args.last(), Some(&settings.target().entry.display().to_string()));
    }

    #[test]
    fn missing_icon_fails_before_any_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let mut target = target_with_entry(dir.path());
        target.platform = Platform::Macos;
        target.icon = Some(dir.path().join("missing.icns"));
        let settings = settings_for(target, dir.path());

        let err = build_arguments(&settings).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget(_)));
    }

    #[test]
    fn linux_targets_drop_declared_icons() {
        let dir = tempfile::tempdir().unwrap();
        let mut target = target_with_entry(dir.path());
        // Nonexistent, but ignored on this platform.
        target.icon = Some(dir.path().join("icon.png"));
        let settings = settings_for(target, dir.path());

        let args = build_arguments(&settings).unwrap();
        assert!(!args.contains(&"--icon".to_string()));
    }
}
