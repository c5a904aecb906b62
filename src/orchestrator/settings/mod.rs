//! Configuration structures for build runs.
//!
//! This module provides the build target definition, external tool
//! configuration, and the builder pattern for constructing per-run
//! settings.

mod builder;
mod core;
mod platform;
mod target;
mod tools;

// Re-export all public types
pub use builder::{DEFAULT_TIMEOUT, SettingsBuilder};
pub use core::Settings;
pub use platform::{PackageMode, Platform};
pub use target::{BuildTarget, DataFile};
pub use tools::{ToolSettings, lenient_version};
