//! Build orchestration: probe, install, clean, package, finish, report.
//!
//! The pipeline replaces the per-OS shell and batch scripts that usually
//! accumulate around a bundling tool with one sequential, fail-fast run:
//!
//! 1. [`probe`] - runtime and bundling tool availability
//! 2. [`deps`] - dependency presence and installation
//! 3. [`clean`] - removal of stale build artifacts
//! 4. [`invoke`] - the bundler subprocess, bounded by a timeout
//! 5. [`post`] - auxiliary files, quarantine, permissions
//! 6. [`report`] - the aggregated pass/fail summary
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeSet;
//! use figcomposer_bundler::orchestrator::{
//!     Pipeline,
//!     settings::{BuildTarget, PackageMode, Platform, SettingsBuilder},
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> figcomposer_bundler::orchestrator::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .target(BuildTarget {
//!         platform: Platform::current(),
//!         mode: PackageMode::OneFile,
//!         windowed: true,
//!         name: "FigureComposer".into(),
//!         icon: None,
//!         entry: "gui.py".into(),
//!         data_files: Vec::new(),
//!         hidden_imports: BTreeSet::new(),
//!         aux_files: Vec::new(),
//!     })
//!     .build()?;
//!
//! let report = Pipeline::new(settings).run(CancellationToken::new()).await;
//! println!("{}", report.render());
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod clean;
pub mod deps;
pub mod error;
pub mod invoke;
pub mod pipeline;
pub mod post;
pub mod probe;
pub mod report;
pub mod settings;
pub mod utils;

pub use error::{Error, Result};
pub use pipeline::{Pipeline, run_all};
pub use report::{BuildReport, BuildStepResult, StepStatus};
pub use settings::{
    BuildTarget, DataFile, PackageMode, Platform, Settings, SettingsBuilder, ToolSettings,
};
