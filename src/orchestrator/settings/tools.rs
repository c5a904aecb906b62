//! External tool configuration.

use semver::Version;
use serde::Deserialize;

/// Programs the orchestrator drives.
///
/// Everything here is an explicit parameter rather than ambient process
/// state, so a run never depends on the caller's working directory or
/// exported environment. Names resolve through PATH unless given as
/// absolute paths.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ToolSettings {
    /// Runtime that executes the application being packaged.
    pub runtime: String,

    /// Minimum acceptable runtime version.
    #[serde(deserialize_with = "de_version")]
    pub runtime_min_version: Version,

    /// The bundling tool invoked to produce the artifact.
    pub bundler: String,

    /// Program that clears the quarantine attribute on macOS artifacts.
    ///
    /// Overridable mainly so tests can observe the invocation.
    pub quarantine_tool: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            runtime: "python3".into(),
            runtime_min_version: Version::new(3, 8, 0),
            bundler: "pyinstaller".into(),
            quarantine_tool: "xattr".into(),
        }
    }
}

/// Deserializes a version floor, zero-filling missing components so
/// config files can write "3.8" instead of "3.8.0".
fn de_version<'de, D>(deserializer: D) -> Result<Version, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    lenient_version(&raw).map_err(serde::de::Error::custom)
}

/// Parses "3", "3.8", or "3.8.1" into a full semantic version.
pub fn lenient_version(raw: &str) -> Result<Version, String> {
    let mut parts = raw.trim().splitn(3, '.');
    let mut component = |name: &str| -> Result<u64, String> {
        match parts.next() {
            None | Some("") => Ok(0),
            Some(p) => p
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("invalid {name} component in version {raw:?}")),
        }
    };
    let major = component("major")?;
    let minor = component("minor")?;
    let patch = component("patch")?;
    Ok(Version::new(major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_version_zero_fills() {
        assert_eq!(lenient_version("3").unwrap(), Version::new(3, 0, 0));
        assert_eq!(lenient_version("3.8").unwrap(), Version::new(3, 8, 0));
        assert_eq!(lenient_version("3.8.1").unwrap(), Version::new(3, 8, 1));
        assert!(lenient_version("three").is_err());
    }

    #[test]
    fn defaults_name_the_standard_toolchain() {
        let tools = ToolSettings::default();
        assert_eq!(tools.runtime, "python3");
        assert_eq!(tools.bundler, "pyinstaller");
        assert_eq!(tools.quarantine_tool, "xattr");
    }
}
