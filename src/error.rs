//! Top-level error types.
//!
//! The orchestrator has its own error taxonomy in
//! [`crate::orchestrator::error`]; this module wraps it together with
//! CLI and configuration errors for the binary's outer layer.

use thiserror::Error;

/// Result type alias for top-level operations.
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for the CLI layer.
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors (report output)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors (project config)
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Orchestration errors
    #[error("{0}")]
    Orchestrator(#[from] crate::orchestrator::Error),
}

impl BundlerError {
    /// Process exit code for this error.
    ///
    /// Orchestration failures keep their per-kind codes; argument and
    /// configuration problems exit 2; everything else exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            BundlerError::Orchestrator(e) => e.exit_code(),
            BundlerError::Cli(_) | BundlerError::Toml(_) => 2,
            _ => 1,
        }
    }
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// A flag value failed validation (bad platform name, malformed
    /// data-file pair, duplicate target block).
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// What was wrong with the input
        reason: String,
    },

    /// A value required for the build was given neither as a flag nor
    /// through the config file.
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Flag the user needs to supply
        argument: String,
    },

    /// An outer-layer operation (e.g. reading the config file) failed.
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Operation that failed
        command: String,
        /// Underlying reason
        reason: String,
    },
}
