//! Error types for packaging orchestration.
//!
//! Provides the full failure taxonomy of a build run, contextual error
//! chaining, and filesystem errors that carry the offending path.
//!
//! Fatal kinds abort the pipeline; warning kinds (`CleanupWarning`,
//! `PostProcessWarning`) are folded into the step message and the run
//! continues. `exit_code` maps each fatal kind to a distinct process
//! exit code for the CLI.

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Errors returned by the orchestrator.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "copying auxiliary file")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Child process could not be spawned or waited on.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// The runtime the bundler packages is not installed.
    ///
    /// Not retried; `detail` carries the corrective action verbatim.
    #[error("runtime {runtime} not found: {detail}")]
    EnvironmentMissing {
        /// Runtime program name (e.g. "python3")
        runtime: String,
        /// Corrective action for the user
        detail: String,
    },

    /// The runtime is installed but older than the required floor.
    #[error("{runtime} {found} is older than required {required}; please upgrade")]
    VersionTooOld {
        /// Runtime program name
        runtime: String,
        /// Version that was detected
        found: String,
        /// Minimum acceptable version
        required: String,
    },

    /// The bundling tool is not resolvable on PATH.
    #[error("bundling tool {tool} not found: {detail}")]
    ToolNotFound {
        /// Tool program name (e.g. "pyinstaller")
        tool: String,
        /// Corrective action for the user
        detail: String,
    },

    /// A declared dependency could not be installed after one retry.
    #[error("failed to install dependency {identifier}: {detail}")]
    DependencyInstallFailed {
        /// Dependency identifier from the manifest
        identifier: String,
        /// Captured installer output / failure reason
        detail: String,
    },

    /// A stale path could not be removed. Non-fatal; the build proceeds.
    #[error("could not remove {path}: {detail}")]
    CleanupWarning {
        /// Path that resisted removal
        path: PathBuf,
        /// Underlying reason
        detail: String,
    },

    /// A finishing action failed. Non-fatal; the artifact already exists.
    #[error("post-processing: {detail}")]
    PostProcessWarning {
        /// What went wrong
        detail: String,
    },

    /// The bundling tool exited non-zero. Not retried.
    #[error("bundler failed: {detail}")]
    PackagingFailed {
        /// Exit status and captured diagnostic output
        detail: String,
    },

    /// The bundling tool exceeded the wall-clock limit and was killed.
    #[error("bundler timed out after {limit_secs}s and was terminated")]
    PackagingTimeout {
        /// Configured limit in seconds
        limit_secs: u64,
    },

    /// The run was cancelled by the user; the in-flight subprocess was killed.
    #[error("build cancelled")]
    Cancelled,

    /// A build target failed validation before any work started.
    #[error("invalid build target: {0}")]
    InvalidTarget(String),

    /// Error walking a directory tree (artifact checksums).
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// Invalid glob pattern in a clean specification.
    #[error("{0}")]
    GlobPattern(#[from] glob::PatternError),

    /// Glob iteration error.
    #[error("{0}")]
    Glob(#[from] glob::GlobError),

    /// Semantic version parsing error.
    #[error("{0}")]
    SemverError(#[from] semver::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Whether this error is a non-fatal warning.
    ///
    /// Warnings are recorded in the step message; the run continues.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Error::CleanupWarning { .. } | Error::PostProcessWarning { .. }
        )
    }

    /// Process exit code for this failure kind.
    ///
    /// Each fatal kind gets a distinct code so callers can script against
    /// the CLI. Context wrappers delegate to the wrapped error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Context(_, inner) => inner.exit_code(),
            Error::InvalidTarget(_) => 2,
            Error::EnvironmentMissing { .. } => 10,
            Error::VersionTooOld { .. } => 11,
            Error::ToolNotFound { .. } => 12,
            Error::DependencyInstallFailed { .. } => 20,
            Error::PackagingFailed { .. } => 30,
            Error::PackagingTimeout { .. } => 31,
            Error::Cancelled => 130,
            _ => 1,
        }
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Works with both `Result<T>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the
    /// operation, e.g., "removing stale directory", "copying auxiliary file".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::orchestrator::error::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::orchestrator::error::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::orchestrator::error::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_are_non_fatal() {
        let w = Error::CleanupWarning {
            path: PathBuf::from("build"),
            detail: "held open".into(),
        };
        assert!(w.is_warning());
        assert!(!Error::Cancelled.is_warning());
    }

    #[test]
    fn exit_codes_are_distinct_per_fatal_kind() {
        let codes = [
            Error::InvalidTarget("x".into()).exit_code(),
            Error::EnvironmentMissing {
                runtime: "python3".into(),
                detail: String::new(),
            }
            .exit_code(),
            Error::VersionTooOld {
                runtime: "python3".into(),
                found: "3.6.0".into(),
                required: "3.8.0".into(),
            }
            .exit_code(),
            Error::ToolNotFound {
                tool: "pyinstaller".into(),
                detail: String::new(),
            }
            .exit_code(),
            Error::DependencyInstallFailed {
                identifier: "PyQt5".into(),
                detail: String::new(),
            }
            .exit_code(),
            Error::PackagingFailed {
                detail: String::new(),
            }
            .exit_code(),
            Error::PackagingTimeout { limit_secs: 60 }.exit_code(),
            Error::Cancelled.exit_code(),
        ];
        let mut unique = codes.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn context_delegates_exit_code() {
        let e = Error::Context(
            "while probing".into(),
            Box::new(Error::ToolNotFound {
                tool: "pyinstaller".into(),
                detail: String::new(),
            }),
        );
        assert_eq!(e.exit_code(), 12);
    }
}
