//! Sequential build pipeline and parallel multi-target coordination.
//!
//! One run executes probe → dependencies → clean → package → finish in
//! order, appending one step result each, and stops at the first fatal
//! failure. Several runs (one per target platform) may execute in
//! parallel as long as their output directories are isolated.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use path_absolutize::Absolutize;
use tokio_util::sync::CancellationToken;

use crate::orchestrator::error::{Error, Result};
use crate::orchestrator::report::{BuildReport, BuildStepResult, StepStatus};
use crate::orchestrator::settings::Settings;
use crate::orchestrator::{checksum, clean, deps, invoke, post, probe};

/// Outcome a step hands back to the pipeline on success.
enum StepMessage {
    /// Step did work.
    Done(String),
    /// Step had nothing to do.
    Skipped(String),
}

/// Drives one build run from settings to report.
pub struct Pipeline {
    settings: Settings,
}

impl Pipeline {
    /// Creates a pipeline for one validated settings instance.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Returns the run settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Executes the full pipeline.
    ///
    /// Never panics and never returns early without a report: every
    /// failure mode lands as a failed step inside the returned report.
    pub async fn run(&self, cancel: CancellationToken) -> BuildReport {
        let run_started = Instant::now();
        let mut report = BuildReport::new(self.settings.target().label());
        let mut artifact: Option<PathBuf> = None;

        // probe
        if let Some(code) = self
            .step(&mut report, "probe", &cancel, async {
                probe::probe(self.settings.tools()).await.map(StepMessage::Done)
            })
            .await
        {
            return self.seal(report, artifact, run_started, code).await;
        }

        // dependencies
        if let Some(code) = self
            .step(&mut report, "dependencies", &cancel, async {
                if self.settings.dependencies().is_empty() {
                    Ok(StepMessage::Skipped("no dependencies declared".into()))
                } else {
                    deps::ensure(
                        &self.settings.tools().runtime,
                        self.settings.dependencies(),
                        &cancel,
                    )
                    .await
                    .map(StepMessage::Done)
                }
            })
            .await
        {
            return self.seal(report, artifact, run_started, code).await;
        }

        // clean
        if let Some(code) = self
            .step(&mut report, "clean", &cancel, async {
                clean::clean(self.settings.clean_paths())
                    .await
                    .map(|outcome| StepMessage::Done(outcome.message()))
            })
            .await
        {
            return self.seal(report, artifact, run_started, code).await;
        }

        // package
        let invoked = invoke_step(&self.settings, &cancel, &mut artifact);
        if let Some(code) = self.step(&mut report, "package", &cancel, invoked).await {
            return self.seal(report, artifact, run_started, code).await;
        }

        // finish
        let Some(produced) = artifact.clone() else {
            return self.seal(report, None, run_started, 1).await;
        };
        if let Some(code) = self
            .step(&mut report, "finish", &cancel, async {
                post::finish(&self.settings, &produced, &cancel)
                    .await
                    .map(StepMessage::Done)
            })
            .await
        {
            return self.seal(report, artifact, run_started, code).await;
        }

        self.seal(report, artifact, run_started, 0).await
    }

    /// Runs one step: cancellation gate, timing, result recording.
    ///
    /// Returns `Some(exit_code)` when the pipeline must stop.
    async fn step(
        &self,
        report: &mut BuildReport,
        name: &'static str,
        cancel: &CancellationToken,
        fut: impl Future<Output = Result<StepMessage>>,
    ) -> Option<i32> {
        if cancel.is_cancelled() {
            let e = Error::Cancelled;
            report.push(BuildStepResult::new(
                name,
                StepStatus::Failed,
                e.to_string(),
                std::time::Duration::ZERO,
            ));
            return Some(e.exit_code());
        }

        let started = Instant::now();
        match fut.await {
            Ok(StepMessage::Done(message)) => {
                report.push(BuildStepResult::new(
                    name,
                    StepStatus::Ok,
                    message,
                    started.elapsed(),
                ));
                None
            }
            Ok(StepMessage::Skipped(message)) => {
                report.push(BuildStepResult::new(
                    name,
                    StepStatus::Skipped,
                    message,
                    started.elapsed(),
                ));
                None
            }
            Err(e) => {
                log::error!("step {name} failed: {e}");
                report.push(BuildStepResult::new(
                    name,
                    StepStatus::Failed,
                    e.to_string(),
                    started.elapsed(),
                ));
                Some(e.exit_code())
            }
        }
    }

    /// Finalizes the report: absolute artifact path, checksum, totals.
    async fn seal(
        &self,
        report: BuildReport,
        artifact: Option<PathBuf>,
        run_started: Instant,
        exit_code: i32,
    ) -> BuildReport {
        let artifact = artifact.map(|path| {
            path.absolutize()
                .map(|abs| abs.into_owned())
                .unwrap_or(path)
        });

        let checksum = match (&artifact, exit_code) {
            (Some(path), 0) => checksum::artifact_sha256(path).await.ok(),
            _ => None,
        };

        report.summarize(artifact, checksum, run_started.elapsed(), exit_code)
    }
}

/// Package step wrapper that threads the artifact path out.
async fn invoke_step(
    settings: &Settings,
    cancel: &CancellationToken,
    artifact: &mut Option<PathBuf>,
) -> Result<StepMessage> {
    let (path, message) = invoke::invoke(settings, cancel).await?;
    *artifact = Some(path);
    Ok(StepMessage::Done(message))
}

/// Runs several builds in parallel, one per target.
///
/// Output directories must be pairwise distinct; sharing one would let
/// concurrent bundler invocations clobber each other's partial output.
/// Reports come back in the same order as the input settings.
pub async fn run_all(
    runs: Vec<Settings>,
    cancel: &CancellationToken,
) -> Result<Vec<BuildReport>> {
    let mut outputs = BTreeSet::new();
    for settings in &runs {
        let abs = settings
            .output_dir()
            .absolutize()
            .map(|a| a.into_owned())
            .unwrap_or_else(|_| settings.output_dir().to_path_buf());
        if !outputs.insert(abs.clone()) {
            return Err(Error::InvalidTarget(format!(
                "output directory {} is shared by more than one target; each build run needs an isolated output directory",
                abs.display()
            )));
        }
    }

    let mut handles = Vec::with_capacity(runs.len());
    for settings in runs {
        let child = cancel.child_token();
        handles.push(tokio::spawn(async move {
            Pipeline::new(settings).run(child).await
        }));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(report) => reports.push(report),
            Err(e) => {
                return Err(Error::GenericError(format!("build task panicked: {e}")));
            }
        }
    }
    Ok(reports)
}
