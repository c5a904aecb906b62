//! Build target definition and validation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{PackageMode, Platform};
use crate::orchestrator::error::{Error, Result};

/// A data file embedded into the bundle.
///
/// `source` is a path on disk; `destination` is the relative location
/// inside the bundle the file is placed at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl DataFile {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Renders the pair as a single bundler argument using the platform's
    /// separator.
    pub fn to_argument(&self, platform: Platform) -> String {
        format!(
            "{}{}{}",
            self.source.display(),
            platform.data_separator(),
            self.destination.display()
        )
    }
}

/// Everything the packager invoker needs to know about one build.
///
/// One `BuildTarget` describes one artifact; building for several
/// platforms means several targets, each with its own output directory.
#[derive(Clone, Debug)]
pub struct BuildTarget {
    /// Operating system the artifact is for.
    pub platform: Platform,
    /// One self-extracting file or a directory of files.
    pub mode: PackageMode,
    /// GUI application (no console window) vs console program.
    pub windowed: bool,
    /// Product name; becomes the artifact file/directory name.
    pub name: String,
    /// Icon file, `.ico` on Windows and `.icns` on macOS. Ignored on Linux.
    pub icon: Option<PathBuf>,
    /// Program handed to the bundling tool (the application entry script).
    pub entry: PathBuf,
    /// Data files embedded into the bundle, in declaration order.
    pub data_files: Vec<DataFile>,
    /// Module hints for imports the bundler's static analysis misses.
    pub hidden_imports: BTreeSet<String>,
    /// Files copied next to the artifact by the post-processor.
    pub aux_files: Vec<PathBuf>,
}

/// Characters that make a name unsafe as a file name on at least one
/// supported platform.
const UNSAFE_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

impl BuildTarget {
    /// Checks the target invariants that do not require disk access.
    ///
    /// Disk-dependent checks (icon and entry existence) happen in the
    /// invoker, immediately before the subprocess would be spawned.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidTarget("name must not be empty".into()));
        }
        if self.name == "." || self.name == ".." || self.name.contains(UNSAFE_NAME_CHARS) {
            return Err(Error::InvalidTarget(format!(
                "name {:?} is not filesystem-safe",
                self.name
            )));
        }
        if let (Some(icon), Some(required)) = (&self.icon, self.platform.icon_extension()) {
            let ext = icon.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !ext.eq_ignore_ascii_case(required) {
                return Err(Error::InvalidTarget(format!(
                    "icon {} must have a .{} extension for {}",
                    icon.display(),
                    required,
                    self.platform
                )));
            }
        }
        Ok(())
    }

    /// Deterministic artifact location for this target.
    ///
    /// One-dir mode produces a directory named after the target; one-file
    /// mode produces a single file, with `.exe` appended on Windows.
    pub fn artifact_path(&self, output_dir: &Path) -> PathBuf {
        let mut path = output_dir.join(&self.name);
        if self.mode == PackageMode::OneFile {
            if let Some(ext) = self.platform.artifact_extension() {
                path.set_extension(ext);
            }
        }
        path
    }

    /// Label used in reports and logs, e.g. "FigureComposer (macos)".
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(platform: Platform, mode: PackageMode) -> BuildTarget {
        BuildTarget {
            platform,
            mode,
            windowed: true,
            name: "FigureComposer".into(),
            icon: None,
            entry: PathBuf::from("gui.py"),
            data_files: Vec::new(),
            hidden_imports: BTreeSet::new(),
            aux_files: Vec::new(),
        }
    }

    #[test]
    fn empty_or_unsafe_names_are_rejected() {
        let mut t = target(Platform::Linux, PackageMode::OneFile);
        t.name = "".into();
        assert!(t.validate().is_err());
        t.name = "fig/composer".into();
        assert!(t.validate().is_err());
        t.name = "Figure Composer 2".into();
        assert!(t.validate().is_ok());
    }

    #[test]
    fn icon_extension_must_match_platform() {
        let mut t = target(Platform::Windows, PackageMode::OneFile);
        t.icon = Some(PathBuf::from("assets/icon.icns"));
        assert!(t.validate().is_err());
        t.icon = Some(PathBuf::from("assets/icon.ico"));
        assert!(t.validate().is_ok());

        // Linux has no icon convention; anything passes validation and the
        // invoker drops it.
        let mut t = target(Platform::Linux, PackageMode::OneFile);
        t.icon = Some(PathBuf::from("assets/icon.xpm"));
        assert!(t.validate().is_ok());
    }

    #[test]
    fn artifact_path_is_deterministic_per_mode() {
        let out = Path::new("dist");
        let t = target(Platform::Macos, PackageMode::OneFile);
        assert_eq!(t.artifact_path(out), Path::new("dist/FigureComposer"));

        let t = target(Platform::Windows, PackageMode::OneFile);
        assert_eq!(t.artifact_path(out), Path::new("dist/FigureComposer.exe"));

        // One-dir is a directory named after the target on every platform.
        let t = target(Platform::Windows, PackageMode::OneDir);
        assert_eq!(t.artifact_path(out), Path::new("dist/FigureComposer"));
    }

    #[test]
    fn data_file_argument_uses_platform_separator() {
        let df = DataFile::new("layout_defaults.json", ".");
        assert_eq!(
            df.to_argument(Platform::Linux),
            "layout_defaults.json:."
        );
        assert_eq!(
            df.to_argument(Platform::Windows),
            "layout_defaults.json;."
        );
    }
}
