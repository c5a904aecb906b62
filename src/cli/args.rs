//! Command line argument parsing and validation.
//!
//! Flags map 1:1 onto build target fields; platform and mode arrive as
//! strings and are validated here so the error message can list the
//! accepted values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::{CliError, Result};
use crate::orchestrator::settings::{PackageMode, Platform};

/// Packaging orchestrator for the FigureComposer desktop application
#[derive(Parser, Debug)]
#[command(
    name = "figcomposer_bundler",
    version,
    about = "Builds standalone FigureComposer executables via an external bundling tool",
    long_about = "Builds standalone executables for Windows, macOS, and Linux by driving an
external bundling tool through a fixed pipeline: environment probe,
dependency install, workspace clean, bundler invocation, and
platform-specific finishing.

Usage:
  figcomposer_bundler build --name FigureComposer --entry gui.py
  figcomposer_bundler build --config bundle.toml --report-json report.json
  figcomposer_bundler clean --output-dir dist

Exit code 0 = every step passed and the artifact exists."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build standalone executables
    Build(BuildArgs),
    /// Remove transient build artifacts
    Clean(CleanArgs),
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Project configuration file (bundle.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Target platform: windows, macos, linux (default: host platform)
    #[arg(short, long, value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// Packaging mode: one-file or one-dir
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Build a windowed (GUI) executable
    #[arg(long)]
    pub windowed: bool,

    /// Build a console executable
    #[arg(long, conflicts_with = "windowed")]
    pub console: bool,

    /// Product name; becomes the artifact name
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Application entry script handed to the bundler
    #[arg(short, long, value_name = "PATH")]
    pub entry: Option<PathBuf>,

    /// Icon file (.ico for windows, .icns for macos; ignored on linux)
    #[arg(long, value_name = "PATH")]
    pub icon: Option<PathBuf>,

    /// Data file to embed, as SOURCE:DEST (repeatable)
    #[arg(long = "add-data", value_name = "SOURCE:DEST")]
    pub add_data: Vec<String>,

    /// Module hint for imports the bundler misses (repeatable)
    #[arg(long = "hidden-import", value_name = "MODULE")]
    pub hidden_import: Vec<String>,

    /// File copied next to the produced artifact (repeatable)
    #[arg(long = "aux-file", value_name = "PATH")]
    pub aux_file: Vec<PathBuf>,

    /// Artifact output directory (default: dist)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory for the bundler's transient build tree and spec file
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Wall-clock limit for one bundler invocation, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Write the build report(s) as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct CleanArgs {
    /// Project configuration file (bundle.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Artifact output directory (default: dist)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding the bundler's transient build tree
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Extra paths or glob patterns to remove
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl BuildArgs {
    /// Parses and validates the `--platform` flag.
    pub fn platform(&self) -> Result<Option<Platform>> {
        parse_flag(self.platform.as_deref(), "--platform")
    }

    /// Parses and validates the `--mode` flag.
    pub fn mode(&self) -> Result<Option<PackageMode>> {
        parse_flag(self.mode.as_deref(), "--mode")
    }

    /// Windowed/console resolution: `--console` wins, `--windowed` is
    /// explicit, absent means "use the config or the default".
    pub fn windowed(&self) -> Option<bool> {
        if self.console {
            Some(false)
        } else if self.windowed {
            Some(true)
        } else {
            None
        }
    }
}

fn parse_flag<T: std::str::FromStr<Err = String>>(
    raw: Option<&str>,
    flag: &str,
) -> Result<Option<T>> {
    match raw {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|reason| {
            CliError::InvalidArguments {
                reason: format!("{flag}: {reason}"),
            }
            .into()
        }),
    }
}

/// Splits a `SOURCE:DEST` data-file argument.
///
/// Splitting happens at the last colon so Windows drive letters in the
/// source survive.
pub fn parse_data_pair(raw: &str) -> Result<(PathBuf, PathBuf)> {
    match raw.rsplit_once(':') {
        Some((source, dest)) if !source.is_empty() && !dest.is_empty() => {
            Ok((PathBuf::from(source), PathBuf::from(dest)))
        }
        _ => Err(CliError::InvalidArguments {
            reason: format!("--add-data expects SOURCE:DEST, got {raw:?}"),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_pair_splits_at_the_last_colon() {
        let (src, dest) = parse_data_pair("layout_defaults.json:.").unwrap();
        assert_eq!(src, PathBuf::from("layout_defaults.json"));
        assert_eq!(dest, PathBuf::from("."));

        let (src, dest) = parse_data_pair(r"C:\assets\fonts:fonts").unwrap();
        assert_eq!(src, PathBuf::from(r"C:\assets\fonts"));
        assert_eq!(dest, PathBuf::from("fonts"));

        assert!(parse_data_pair("no-separator").is_err());
        assert!(parse_data_pair("trailing:").is_err());
    }

    #[test]
    fn build_subcommand_parses_target_flags() {
        let args = Args::try_parse_from([
            "figcomposer_bundler",
            "build",
            "--platform",
            "macos",
            "--mode",
            "one-file",
            "--windowed",
            "--name",
            "Tool",
            "--entry",
            "gui.py",
            "--icon",
            "icon.icns",
        ])
        .unwrap();

        let Command::Build(build) = args.command else {
            panic!("expected build subcommand");
        };
        assert_eq!(build.platform().unwrap(), Some(Platform::Macos));
        assert_eq!(build.mode().unwrap(), Some(PackageMode::OneFile));
        assert_eq!(build.windowed(), Some(true));
        assert_eq!(build.name.as_deref(), Some("Tool"));
    }

    #[test]
    fn unknown_platform_is_a_cli_error() {
        let args = Args::try_parse_from([
            "figcomposer_bundler",
            "build",
            "--platform",
            "solaris",
        ])
        .unwrap();
        let Command::Build(build) = args.command else {
            panic!("expected build subcommand");
        };
        assert!(build.platform().is_err());
    }
}
