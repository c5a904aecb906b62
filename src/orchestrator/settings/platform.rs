//! Target platform and packaging mode types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating system a build run targets.
///
/// The platform is data, not a compile-time property: it selects the icon
/// format, the data-file separator handed to the bundling tool, and which
/// finishing actions the post-processor applies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Macos,
    Linux,
}

impl Platform {
    /// Platform of the host this process runs on.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Macos
        } else {
            Platform::Linux
        }
    }

    /// Required icon file extension, if the platform uses one.
    ///
    /// Linux desktop launchers take icons through other channels, so any
    /// declared icon is ignored there.
    pub fn icon_extension(&self) -> Option<&'static str> {
        match self {
            Platform::Windows => Some("ico"),
            Platform::Macos => Some("icns"),
            Platform::Linux => None,
        }
    }

    /// Separator between source and destination in a data-file pair.
    ///
    /// The bundling tool expects `;` on Windows and `:` elsewhere.
    pub fn data_separator(&self) -> char {
        match self {
            Platform::Windows => ';',
            Platform::Macos | Platform::Linux => ':',
        }
    }

    /// Extension appended to a one-file artifact, if any.
    pub fn artifact_extension(&self) -> Option<&'static str> {
        match self {
            Platform::Windows => Some("exe"),
            Platform::Macos | Platform::Linux => None,
        }
    }

    /// Short lowercase name ("windows", "macos", "linux").
    pub fn short_name(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Macos => "macos",
            Platform::Linux => "linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(Platform::Windows),
            "macos" | "mac" | "darwin" => Ok(Platform::Macos),
            "linux" => Ok(Platform::Linux),
            other => Err(format!(
                "unknown platform: {other}. Valid platforms: windows, macos, linux"
            )),
        }
    }
}

/// Packaging mode: a single self-extracting file or a directory of files.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageMode {
    OneFile,
    OneDir,
}

impl PackageMode {
    /// Bundler flag selecting this mode.
    pub fn bundler_flag(&self) -> &'static str {
        match self {
            PackageMode::OneFile => "--onefile",
            PackageMode::OneDir => "--onedir",
        }
    }

    /// Short kebab-case name ("one-file", "one-dir").
    pub fn short_name(&self) -> &'static str {
        match self {
            PackageMode::OneFile => "one-file",
            PackageMode::OneDir => "one-dir",
        }
    }
}

impl fmt::Display for PackageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for PackageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "one-file" | "onefile" => Ok(PackageMode::OneFile),
            "one-dir" | "onedir" => Ok(PackageMode::OneDir),
            other => Err(format!(
                "unknown mode: {other}. Valid modes: one-file, one-dir"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_extensions_follow_platform_convention() {
        assert_eq!(Platform::Windows.icon_extension(), Some("ico"));
        assert_eq!(Platform::Macos.icon_extension(), Some("icns"));
        assert_eq!(Platform::Linux.icon_extension(), None);
    }

    #[test]
    fn data_separator_differs_on_windows() {
        assert_eq!(Platform::Windows.data_separator(), ';');
        assert_eq!(Platform::Linux.data_separator(), ':');
        assert_eq!(Platform::Macos.data_separator(), ':');
    }

    #[test]
    fn parses_common_aliases() {
        assert_eq!("darwin".parse::<Platform>(), Ok(Platform::Macos));
        assert_eq!("WIN".parse::<Platform>(), Ok(Platform::Windows));
        assert_eq!("onefile".parse::<PackageMode>(), Ok(PackageMode::OneFile));
        assert!("beos".parse::<Platform>().is_err());
    }
}
