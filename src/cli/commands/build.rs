//! The `build` subcommand: assemble settings, run pipelines, report.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{BuildArgs, parse_data_pair};
use crate::config::BundleConfig;
use crate::error::{CliError, Result};
use crate::orchestrator::settings::{
    BuildTarget, DataFile, PackageMode, Settings, SettingsBuilder,
};
use crate::orchestrator::{self, BuildReport};

/// Runs one build per resolved target, in parallel, and prints reports.
pub async fn execute(args: BuildArgs) -> Result<i32> {
    let runs = assemble(&args)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, cancelling build");
            on_interrupt.cancel();
        }
    });

    let reports = orchestrator::run_all(runs, &cancel).await?;

    for report in &reports {
        println!("{}", report.render());
    }

    if let Some(path) = &args.report_json {
        write_json_report(path, &reports)?;
    }

    Ok(reports
        .iter()
        .map(|r| r.exit_code)
        .find(|code| *code != 0)
        .unwrap_or(0))
}

fn write_json_report(path: &std::path::Path, reports: &[BuildReport]) -> Result<()> {
    let json = match reports {
        [single] => serde_json::to_string_pretty(single)?,
        many => serde_json::to_string_pretty(many)?,
    };
    std::fs::write(path, json)?;
    log::info!("wrote JSON report to {}", path.display());
    Ok(())
}

/// Merges the optional project config with CLI flags into one settings
/// instance per target platform. Flags win over config values.
fn assemble(args: &BuildArgs) -> Result<Vec<Settings>> {
    let config = args
        .config
        .as_deref()
        .map(BundleConfig::load)
        .transpose()?;

    let name = args
        .name
        .clone()
        .or_else(|| config.as_ref().map(|c| c.package.name.clone()))
        .ok_or(CliError::MissingArgument {
            argument: "--name (or --config)".into(),
        })?;

    let entry = args
        .entry
        .clone()
        .or_else(|| config.as_ref().map(|c| c.package.entry.clone()))
        .ok_or(CliError::MissingArgument {
            argument: "--entry (or --config)".into(),
        })?;

    let mut data_files: Vec<DataFile> = config
        .as_ref()
        .map(|c| {
            c.package
                .data_files
                .iter()
                .map(|d| DataFile::new(d.source.clone(), d.destination.clone()))
                .collect()
        })
        .unwrap_or_default();
    for raw in &args.add_data {
        let (source, dest) = parse_data_pair(raw)?;
        data_files.push(DataFile::new(source, dest));
    }

    let mut hidden_imports: BTreeSet<String> = config
        .as_ref()
        .map(|c| c.package.hidden_imports.iter().cloned().collect())
        .unwrap_or_default();
    hidden_imports.extend(args.hidden_import.iter().cloned());

    let mut aux_files: Vec<PathBuf> = config
        .as_ref()
        .map(|c| c.package.aux_files.clone())
        .unwrap_or_default();
    aux_files.extend(args.aux_file.iter().cloned());

    let platforms = match args.platform()? {
        Some(platform) => vec![platform],
        None => config
            .as_ref()
            .map(|c| c.platforms())
            .unwrap_or_else(|| vec![orchestrator::Platform::current()]),
    };

    let base_output = args
        .output_dir
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.build.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("dist"));
    let base_work = args
        .work_dir
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.build.work_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."));
    let timeout = args
        .timeout_secs
        .or_else(|| config.as_ref().and_then(|c| c.build.timeout_secs))
        .map(Duration::from_secs);

    // Parallel runs need isolated output and work directories; a single
    // run keeps the flat layout the tutorial scripts used.
    let isolate = platforms.len() > 1;

    let mut runs = Vec::with_capacity(platforms.len());
    for platform in platforms {
        let target_cfg = config.as_ref().and_then(|c| c.target_for(platform));

        let target = BuildTarget {
            platform,
            mode: args
                .mode()?
                .or_else(|| target_cfg.and_then(|t| t.mode))
                .unwrap_or(PackageMode::OneFile),
            windowed: args
                .windowed()
                .or_else(|| target_cfg.and_then(|t| t.windowed))
                .unwrap_or(true),
            name: name.clone(),
            icon: args
                .icon
                .clone()
                .or_else(|| target_cfg.and_then(|t| t.icon.clone())),
            entry: entry.clone(),
            data_files: data_files.clone(),
            hidden_imports: hidden_imports.clone(),
            aux_files: aux_files.clone(),
        };

        let (output_dir, work_dir) = if isolate {
            (
                base_output.join(platform.short_name()),
                base_work.join(format!("work-{}", platform.short_name())),
            )
        } else {
            (base_output.clone(), base_work.clone())
        };

        let mut builder = SettingsBuilder::new()
            .target(target)
            .output_dir(output_dir)
            .work_dir(work_dir);
        if let Some(config) = &config {
            builder = builder
                .tools(config.tools.clone())
                .dependencies(config.dependencies.clone())
                .extra_clean(config.build.clean.clone());
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        runs.push(builder.build()?);
    }

    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Command};
    use clap::Parser;

    fn build_args(argv: &[&str]) -> BuildArgs {
        let mut full = vec!["figcomposer_bundler", "build"];
        full.extend_from_slice(argv);
        match Args::parse_from(full).command {
            Command::Build(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn flags_alone_produce_one_host_target() {
        let args = build_args(&["--name", "Tool", "--entry", "gui.py"]);
        let runs = assemble(&args).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].target().platform, orchestrator::Platform::current());
        assert_eq!(runs[0].target().name, "Tool");
        // Single run keeps the flat layout.
        assert_eq!(runs[0].output_dir(), std::path::Path::new("dist"));
    }

    #[test]
    fn missing_name_is_reported() {
        let args = build_args(&["--entry", "gui.py"]);
        assert!(assemble(&args).is_err());
    }

    #[test]
    fn config_targets_get_isolated_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bundle.toml");
        std::fs::write(
            &config_path,
            r#"
                [package]
                name = "FigureComposer"
                entry = "gui.py"

                [[target]]
                platform = "linux"

                [[target]]
                platform = "windows"
                icon = "assets/icon.ico"
            "#,
        )
        .unwrap();

        let args = build_args(&["--config", config_path.to_str().unwrap()]);
        let runs = assemble(&args).unwrap();
        assert_eq!(runs.len(), 2);
        let outputs: Vec<_> = runs.iter().map(|r| r.output_dir().to_path_buf()).collect();
        assert_ne!(outputs[0], outputs[1]);
    }

    #[test]
    fn platform_flag_narrows_config_targets() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bundle.toml");
        std::fs::write(
            &config_path,
            r#"
                [package]
                name = "FigureComposer"
                entry = "gui.py"

                [[target]]
                platform = "linux"

                [[target]]
                platform = "macos"
                icon = "assets/icon.icns"
            "#,
        )
        .unwrap();

        let args = build_args(&[
            "--config",
            config_path.to_str().unwrap(),
            "--platform",
            "macos",
        ]);
        let runs = assemble(&args).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].target().platform, orchestrator::Platform::Macos);
        assert_eq!(
            runs[0].target().icon.as_deref(),
            Some(std::path::Path::new("assets/icon.icns"))
        );
    }
}
