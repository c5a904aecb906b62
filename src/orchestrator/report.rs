//! Build step results and the aggregated build report.
//!
//! Each pipeline component produces one [`BuildStepResult`]; the report is
//! created empty when a run starts, appended to in step order, and
//! finalized once the run ends. Steps after a failed entry never execute,
//! so a failed report lists exactly the steps that ran.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of a single pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step completed (possibly with recorded warnings).
    Ok,
    /// Step failed; the pipeline stopped here.
    Failed,
    /// Step had nothing to do (e.g. empty dependency manifest).
    Skipped,
}

/// Result of one pipeline step. Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct BuildStepResult {
    /// Step name ("probe", "dependencies", "clean", "package", "finish").
    pub step: &'static str,
    /// Step outcome.
    pub status: StepStatus,
    /// Human-readable outcome, including any warnings.
    pub message: String,
    /// Wall-clock duration of the step.
    pub duration_ms: u64,
}

impl BuildStepResult {
    pub fn new(
        step: &'static str,
        status: StepStatus,
        message: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            step,
            status,
            message: message.into(),
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Aggregated outcome of one build run.
///
/// Owned exclusively by the pipeline for the duration of the run; handed
/// to the caller on completion.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Product name and platform label, e.g. "FigureComposer (macos)".
    pub target: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Step results in execution order.
    pub steps: Vec<BuildStepResult>,
    /// `true` iff every step is ok or skipped.
    pub success: bool,
    /// Absolute path of the produced artifact, on success.
    pub artifact: Option<PathBuf>,
    /// SHA-256 of the artifact (file or directory tree), on success.
    pub checksum: Option<String>,
    /// Total elapsed wall-clock time.
    pub total_duration_ms: u64,
    /// Process exit code: 0 on success, the first fatal error's code otherwise.
    pub exit_code: i32,
}

impl BuildReport {
    /// Creates an empty report for a run that is about to start.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            started_at: Utc::now(),
            steps: Vec::new(),
            success: false,
            artifact: None,
            checksum: None,
            total_duration_ms: 0,
            exit_code: 0,
        }
    }

    /// Appends a step result.
    pub fn push(&mut self, step: BuildStepResult) {
        self.steps.push(step);
    }

    /// Folds the recorded steps into the overall outcome.
    ///
    /// Overall success requires every step to be ok or skipped; any failed
    /// step fails the run. The artifact path is only kept on success.
    pub fn summarize(
        mut self,
        artifact: Option<PathBuf>,
        checksum: Option<String>,
        total: Duration,
        exit_code: i32,
    ) -> Self {
        self.success = self
            .steps
            .iter()
            .all(|s| matches!(s.status, StepStatus::Ok | StepStatus::Skipped));
        self.artifact = if self.success { artifact } else { None };
        self.checksum = if self.success { checksum } else { None };
        self.total_duration_ms = total.as_millis() as u64;
        self.exit_code = if self.success { 0 } else { exit_code };
        self
    }

    /// First failed step, if any.
    pub fn first_failure(&self) -> Option<&BuildStepResult> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    /// Renders the human-readable summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Build report for {}\n", self.target));
        for step in &self.steps {
            let glyph = match step.status {
                StepStatus::Ok => "✓",
                StepStatus::Failed => "✗",
                StepStatus::Skipped => "-",
            };
            out.push_str(&format!(
                "  {} {:<12} {:>6}ms  {}\n",
                glyph, step.step, step.duration_ms, step.message
            ));
        }
        if self.success {
            out.push_str(&format!(
                "OK in {}ms",
                self.total_duration_ms
            ));
            if let Some(artifact) = &self.artifact {
                out.push_str(&format!("  artifact: {}", artifact.display()));
            }
            if let Some(checksum) = &self.checksum {
                out.push_str(&format!("\n  sha256: {checksum}"));
            }
        } else if let Some(failed) = self.first_failure() {
            out.push_str(&format!(
                "FAILED at step '{}' in {}ms: {}",
                failed.step, self.total_duration_ms, failed.message
            ));
        } else {
            out.push_str("FAILED before any step ran");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &'static str, status: StepStatus) -> BuildStepResult {
        BuildStepResult::new(name, status, "msg", Duration::from_millis(5))
    }

    #[test]
    fn all_ok_or_skipped_is_success() {
        let mut report = BuildReport::new("App (linux)");
        report.push(step("probe", StepStatus::Ok));
        report.push(step("dependencies", StepStatus::Skipped));
        report.push(step("package", StepStatus::Ok));
        let report = report.summarize(
            Some(PathBuf::from("/tmp/dist/App")),
            None,
            Duration::from_millis(30),
            0,
        );
        assert!(report.success);
        assert_eq!(report.exit_code, 0);
        assert_eq!(report.artifact, Some(PathBuf::from("/tmp/dist/App")));
    }

    #[test]
    fn any_failed_step_fails_the_report() {
        let mut report = BuildReport::new("App (macos)");
        report.push(step("probe", StepStatus::Ok));
        report.push(step("package", StepStatus::Failed));
        let report = report.summarize(
            Some(PathBuf::from("/tmp/dist/App")),
            None,
            Duration::from_millis(30),
            30,
        );
        assert!(!report.success);
        assert_eq!(report.exit_code, 30);
        // A failed run never advertises an artifact.
        assert!(report.artifact.is_none());
        assert_eq!(report.first_failure().map(|s| s.step), Some("package"));
    }

    #[test]
    fn render_names_the_first_fatal_step() {
        let mut report = BuildReport::new("App (windows)");
        report.push(step("probe", StepStatus::Failed));
        let report = report.summarize(None, None, Duration::from_millis(2), 10);
        let text = report.render();
        assert!(text.contains("FAILED at step 'probe'"));
    }
}
