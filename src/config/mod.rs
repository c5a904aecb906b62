//! Project configuration loaded from a `bundle.toml` file.
//!
//! The config declares the package being bundled, the dependency
//! manifest, tool overrides, and one `[[target]]` block per platform to
//! build for. CLI flags override individual values.
//!
//! ```toml
//! [package]
//! name = "FigureComposer"
//! entry = "gui.py"
//! hidden-imports = ["PyQt5.sip"]
//! aux-files = ["layout_defaults.json"]
//!
//! [[package.data-files]]
//! source = "layout_defaults.json"
//! destination = "."
//!
//! [build]
//! output-dir = "dist"
//! timeout-secs = 600
//!
//! [[dependency]]
//! id = "PyQt5"
//! min-version = "5.15"
//! install = "python3 -m pip install PyQt5"
//!
//! [[target]]
//! platform = "macos"
//! mode = "one-file"
//! windowed = true
//! icon = "assets/icon.icns"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BundlerError, CliError, Result};
use crate::orchestrator::deps::{self, Dependency};
use crate::orchestrator::settings::{PackageMode, Platform, ToolSettings};

/// Root of a `bundle.toml` project configuration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BundleConfig {
    /// The application being bundled.
    pub package: PackageConfig,

    /// Directory layout and limits.
    #[serde(default)]
    pub build: BuildConfig,

    /// External tool overrides.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Dependency manifest.
    #[serde(default, rename = "dependency")]
    pub dependencies: Vec<Dependency>,

    /// One block per platform to build for. Empty means the host
    /// platform with defaults.
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetConfig>,
}

/// `[package]` section.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageConfig {
    /// Product name; becomes the artifact name.
    pub name: String,

    /// Application entry script.
    pub entry: PathBuf,

    /// Data files embedded into every target's bundle.
    #[serde(default)]
    pub data_files: Vec<DataFileConfig>,

    /// Hidden-import hints applied to every target.
    #[serde(default)]
    pub hidden_imports: Vec<String>,

    /// Files copied next to every produced artifact.
    #[serde(default)]
    pub aux_files: Vec<PathBuf>,
}

/// An embedded data file declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DataFileConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// `[build]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Base artifact output directory. Default: `dist`.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Base transient work directory. Default: the current directory.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Wall-clock limit for one bundler invocation, in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Extra paths or glob patterns removed by the cleaner.
    #[serde(default)]
    pub clean: Vec<String>,
}

/// One `[[target]]` block.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TargetConfig {
    /// Platform this block builds for.
    pub platform: Platform,

    /// Packaging mode. Default: one-file.
    #[serde(default)]
    pub mode: Option<PackageMode>,

    /// Windowed (GUI) build. Default: true.
    #[serde(default)]
    pub windowed: Option<bool>,

    /// Platform-specific icon file.
    #[serde(default)]
    pub icon: Option<PathBuf>,
}

impl BundleConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BundlerError::Cli(CliError::ExecutionFailed {
                command: "read config".to_string(),
                reason: format!("failed to read {}: {e}", path.display()),
            })
        })?;

        let config: BundleConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field invariants the type system can't.
    fn validate(&self) -> Result<()> {
        deps::validate_manifest(&self.dependencies)?;

        let mut platforms = std::collections::BTreeSet::new();
        for target in &self.targets {
            if !platforms.insert(target.platform) {
                return Err(BundlerError::Cli(CliError::InvalidArguments {
                    reason: format!(
                        "duplicate [[target]] block for platform {}",
                        target.platform
                    ),
                }));
            }
        }
        Ok(())
    }

    /// Target block for a platform, if declared.
    pub fn target_for(&self, platform: Platform) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.platform == platform)
    }

    /// Platforms this config builds for, host platform when none are
    /// declared.
    pub fn platforms(&self) -> Vec<Platform> {
        if self.targets.is_empty() {
            vec![Platform::current()]
        } else {
            self.targets.iter().map(|t| t.platform).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [package]
        name = "FigureComposer"
        entry = "gui.py"
        hidden-imports = ["PyQt5.sip"]
        aux-files = ["layout_defaults.json"]

        [[package.data-files]]
        source = "layout_defaults.json"
        destination = "."

        [build]
        output-dir = "dist"
        timeout-secs = 300
        clean = ["__pycache__"]

        [tools]
        runtime-min-version = "3.8"

        [[dependency]]
        id = "PyQt5"
        min-version = "5.15"
        install = "python3 -m pip install PyQt5"

        [[dependency]]
        id = "Pillow"
        install = "python3 -m pip install Pillow"

        [[target]]
        platform = "macos"
        windowed = true
        icon = "assets/icon.icns"

        [[target]]
        platform = "windows"
        mode = "one-dir"
        icon = "assets/icon.ico"
    "#;

    #[test]
    fn parses_a_full_project_config() {
        let config: BundleConfig = toml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.package.name, "FigureComposer");
        assert_eq!(config.dependencies.len(), 2);
        assert_eq!(
            config.platforms(),
            vec![Platform::Macos, Platform::Windows]
        );
        let windows = config.target_for(Platform::Windows).unwrap();
        assert_eq!(windows.mode, Some(PackageMode::OneDir));
        assert_eq!(config.build.timeout_secs, Some(300));
        assert_eq!(config.tools.runtime_min_version.minor, 8);
    }

    #[test]
    fn duplicate_target_platforms_are_rejected() {
        let raw = r#"
            [package]
            name = "App"
            entry = "main.py"

            [[target]]
            platform = "linux"

            [[target]]
            platform = "linux"
        "#;
        let config: BundleConfig = toml::from_str(raw).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_dependency_ids_are_rejected() {
        let raw = r#"
            [package]
            name = "App"
            entry = "main.py"

            [[dependency]]
            id = "PyQt5"
            install = "pip install PyQt5"

            [[dependency]]
            id = "PyQt5"
            install = "pip install PyQt5"
        "#;
        let config: BundleConfig = toml::from_str(raw).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_targets_default_to_the_host_platform() {
        let raw = r#"
            [package]
            name = "App"
            entry = "main.py"
        "#;
        let config: BundleConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.platforms(), vec![Platform::current()]);
    }
}
