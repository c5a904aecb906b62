//! Subprocess execution with captured output, timeout, and cancellation.

use std::ffi::OsStr;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use crate::orchestrator::error::{Error, Result};

/// Grace period between killing a subprocess and giving up on its exit.
const KILL_GRACE: Duration = Duration::from_secs(10);

/// How a bounded subprocess run ended.
#[derive(Debug)]
pub enum Wait {
    /// The process exited on its own.
    Completed(ExitStatus),
    /// The wall-clock limit elapsed; the process was killed.
    TimedOut,
    /// The run was cancelled; the process was killed.
    Cancelled,
}

impl Wait {
    /// Exit status for call sites that run without a wall-clock limit.
    ///
    /// Cancellation maps to its error; a timeout can only be produced
    /// when a limit was set, and those call sites match on `Wait`
    /// directly instead.
    pub fn completed(self) -> Result<ExitStatus> {
        match self {
            Wait::Completed(status) => Ok(status),
            Wait::Cancelled => Err(Error::Cancelled),
            Wait::TimedOut => Err(Error::GenericError("subprocess timed out".into())),
        }
    }
}

/// Outcome of a captured subprocess run.
#[derive(Debug)]
pub struct Captured {
    pub wait: Wait,
    /// Combined stdout and stderr lines, in arrival order per stream.
    pub output: Vec<String>,
}

impl Captured {
    /// Last `n` captured lines, joined. Used for diagnostic messages.
    pub fn tail(&self, n: usize) -> String {
        let start = self.output.len().saturating_sub(n);
        self.output[start..].join("\n")
    }
}

/// Runs a program with captured combined output.
///
/// Both output streams are drained concurrently while waiting, so a chatty
/// subprocess can't dead-lock on a full pipe. On timeout or cancellation
/// the child is killed and given [`KILL_GRACE`] to exit before we stop
/// waiting on it.
pub async fn run_captured<I, S>(
    program: &str,
    args: I,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<Captured>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|error| Error::CommandFailed {
            command: program.to_string(),
            error,
        })?;

    let stdout_task = spawn_line_reader(child.stdout.take());
    let stderr_task = spawn_line_reader(child.stderr.take());

    let wait = tokio::select! {
        _ = cancel.cancelled() => {
            kill_with_grace(&mut child, program).await;
            Wait::Cancelled
        }
        status = bounded_wait(&mut child, timeout) => match status {
            Some(result) => {
                let status = result.map_err(|error| Error::CommandFailed {
                    command: program.to_string(),
                    error,
                })?;
                Wait::Completed(status)
            }
            None => {
                kill_with_grace(&mut child, program).await;
                Wait::TimedOut
            }
        }
    };

    // The child is dead or reaped at this point, so its pipes are closed
    // and the readers finish on their own.
    let mut output = stdout_task.await.unwrap_or_default();
    output.extend(stderr_task.await.unwrap_or_default());

    Ok(Captured { wait, output })
}

/// Waits for the child, bounded by `timeout` when one is set.
///
/// Returns `None` when the limit elapsed.
async fn bounded_wait(
    child: &mut Child,
    timeout: Option<Duration>,
) -> Option<std::io::Result<ExitStatus>> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait()).await.ok(),
        None => Some(child.wait().await),
    }
}

async fn kill_with_grace(child: &mut Child, program: &str) {
    if let Err(e) = child.kill().await {
        log::warn!("failed to kill {program}: {e}");
    }
    let _ = tokio::time::timeout(KILL_GRACE, child.wait()).await;
}

fn spawn_line_reader<R>(stream: Option<R>) -> tokio::task::JoinHandle<Vec<String>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines_out = Vec::new();
        if let Some(stream) = stream {
            let mut lines = BufReader::new(stream).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                log::debug!("| {line}");
                lines_out.push(line);
            }
        }
        lines_out
    })
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_output_and_exit_status() {
        let cancel = CancellationToken::new();
        let captured = run_captured("sh", ["-c", "echo one; echo two >&2"], None, &cancel)
            .await
            .unwrap();
        assert!(matches!(captured.wait, Wait::Completed(s) if s.success()));
        assert!(captured.output.contains(&"one".to_string()));
        assert!(captured.output.contains(&"two".to_string()));
    }

    #[tokio::test]
    async fn timeout_kills_the_child() {
        let cancel = CancellationToken::new();
        let started = std::time::Instant::now();
        let captured = run_captured(
            "sh",
            ["-c", "sleep 30"],
            Some(Duration::from_millis(200)),
            &cancel,
        )
        .await
        .unwrap();
        assert!(matches!(captured.wait, Wait::TimedOut));
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[tokio::test]
    async fn cancellation_kills_the_child() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });
        let captured = run_captured("sh", ["-c", "sleep 30"], None, &cancel)
            .await
            .unwrap();
        assert!(matches!(captured.wait, Wait::Cancelled));
    }
}
