//! Builder for constructing Settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{BuildTarget, Settings, ToolSettings};
use crate::orchestrator::deps::{self, Dependency};
use crate::orchestrator::error::Context;

/// Default wall-clock limit for one bundler invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Builder for [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use std::collections::BTreeSet;
/// use figcomposer_bundler::orchestrator::settings::{
///     BuildTarget, PackageMode, Platform, SettingsBuilder,
/// };
///
/// # fn example() -> figcomposer_bundler::orchestrator::Result<()> {
/// let settings = SettingsBuilder::new()
///     .target(BuildTarget {
///         platform: Platform::Macos,
///         mode: PackageMode::OneFile,
///         windowed: true,
///         name: "FigureComposer".into(),
///         icon: Some("assets/icon.icns".into()),
///         entry: "gui.py".into(),
///         data_files: Vec::new(),
///         hidden_imports: BTreeSet::new(),
///         aux_files: Vec::new(),
///     })
///     .output_dir("dist")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    target: Option<BuildTarget>,
    tools: ToolSettings,
    output_dir: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    dependencies: Vec<Dependency>,
    extra_clean: Vec<String>,
    timeout: Option<Duration>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the build target.
    ///
    /// # Required
    pub fn target(mut self, target: BuildTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the tool configuration.
    ///
    /// Default: `python3` / `pyinstaller` / `xattr`.
    pub fn tools(mut self, tools: ToolSettings) -> Self {
        self.tools = tools;
        self
    }

    /// Sets the artifact output directory.
    ///
    /// Default: `dist`
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the transient work directory.
    ///
    /// Default: the current directory.
    pub fn work_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.work_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the dependency manifest.
    ///
    /// Default: empty (the installer step is skipped).
    pub fn dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Adds extra clean paths or glob patterns.
    pub fn extra_clean(mut self, paths: Vec<String>) -> Self {
        self.extra_clean = paths;
        self
    }

    /// Sets the packaging timeout.
    ///
    /// Default: 600 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is missing, the target fails
    /// validation, or the dependency manifest contains duplicate
    /// identifiers.
    pub fn build(self) -> crate::orchestrator::Result<Settings> {
        let target = self.target.context("target is required")?;
        target.validate()?;
        deps::validate_manifest(&self.dependencies)?;

        Ok(Settings::new(
            target,
            self.tools,
            self.output_dir.unwrap_or_else(|| PathBuf::from("dist")),
            self.work_dir.unwrap_or_else(|| PathBuf::from(".")),
            self.dependencies,
            self.extra_clean,
            self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::settings::{PackageMode, Platform};
    use std::collections::BTreeSet;

    fn minimal_target() -> BuildTarget {
        BuildTarget {
            platform: Platform::Linux,
            mode: PackageMode::OneDir,
            windowed: false,
            name: "FigureComposer".into(),
            icon: None,
            entry: "gui.py".into(),
            data_files: Vec::new(),
            hidden_imports: BTreeSet::new(),
            aux_files: Vec::new(),
        }
    }

    #[test]
    fn target_is_required() {
        assert!(SettingsBuilder::new().build().is_err());
    }

    #[test]
    fn defaults_fill_in_layout() {
        let settings = SettingsBuilder::new()
            .target(minimal_target())
            .build()
            .unwrap();
        assert_eq!(settings.output_dir(), Path::new("dist"));
        assert_eq!(settings.timeout(), DEFAULT_TIMEOUT);
        let clean = settings.clean_paths();
        assert!(clean.iter().any(|p| p.ends_with("*.spec")));
        assert!(clean.contains(&"dist".to_string()));
    }

    #[test]
    fn invalid_target_is_rejected_at_build() {
        let mut target = minimal_target();
        target.name = "a/b".into();
        assert!(SettingsBuilder::new().target(target).build().is_err());
    }
}
