//! Core Settings struct for one build run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{BuildTarget, ToolSettings};
use crate::orchestrator::deps::Dependency;

/// Main settings for one build run.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder). Contains
/// the build target, tool configuration, directory layout, the dependency
/// manifest, and the packaging timeout.
#[derive(Clone, Debug)]
pub struct Settings {
    /// What to build.
    target: BuildTarget,

    /// Which programs to drive.
    tools: ToolSettings,

    /// Directory the artifact lands in. Not shared between runs.
    output_dir: PathBuf,

    /// Directory for the bundler's transient build tree and generated
    /// spec file.
    work_dir: PathBuf,

    /// Libraries the application needs at bundle time.
    dependencies: Vec<Dependency>,

    /// Extra paths or glob patterns the cleaner removes, in addition to
    /// the standard transient set.
    extra_clean: Vec<String>,

    /// Wall-clock limit for the bundler invocation.
    timeout: Duration,
}

impl Settings {
    /// Returns the build target.
    pub fn target(&self) -> &BuildTarget {
        &self.target
    }

    /// Returns the tool configuration.
    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    /// Returns the artifact output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the transient work directory.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Returns the dependency manifest.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Returns the packaging timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Deterministic artifact location for this run.
    pub fn artifact_path(&self) -> PathBuf {
        self.target.artifact_path(&self.output_dir)
    }

    /// Paths and glob patterns the cleaner removes before a build.
    ///
    /// Always includes the prior output directory, the bundler's build
    /// tree, and any generated spec files in the work directory; extras
    /// from configuration come last.
    pub fn clean_paths(&self) -> Vec<String> {
        let mut paths = vec![
            self.output_dir.display().to_string(),
            self.work_dir.join("build").display().to_string(),
            self.work_dir.join("*.spec").display().to_string(),
        ];
        paths.extend(self.extra_clean.iter().cloned());
        paths
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    pub(super) fn new(
        target: BuildTarget,
        tools: ToolSettings,
        output_dir: PathBuf,
        work_dir: PathBuf,
        dependencies: Vec<Dependency>,
        extra_clean: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            target,
            tools,
            output_dir,
            work_dir,
            dependencies,
            extra_clean,
            timeout,
        }
    }
}
