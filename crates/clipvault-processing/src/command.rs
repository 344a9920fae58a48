//! Bounded execution of external tools and other blocking calls.

use std::ffi::OsString;
use std::future::Future;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::error::{PipelineError, PipelineResult};

/// Validate a configured tool path before it is ever executed.
///
/// Tools are spawned directly (never through a shell), but a path with shell
/// metacharacters or traversal almost always means a broken configuration.
pub(crate) fn validate_tool_path(path: &str) -> PipelineResult<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() {
        return Err(PipelineError::InvalidToolPath("path is empty".to_string()));
    }
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(PipelineError::InvalidToolPath(format!(
            "path contains dangerous characters: {}",
            path
        )));
    }
    if path.contains("..") {
        return Err(PipelineError::InvalidToolPath(format!(
            "path contains directory traversal: {}",
            path
        )));
    }
    Ok(())
}

/// Run `fut` until it finishes, `cancel` fires, or `limit` elapses.
///
/// Whatever `fut` owns is dropped on cancellation or timeout; for tool runs
/// that kills the child process.
pub(crate) async fn run_bounded<T, F>(
    operation: &'static str,
    limit: Duration,
    cancel: &CancellationToken,
    fut: F,
) -> PipelineResult<T>
where
    F: Future<Output = PipelineResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled { operation }),
        result = tokio::time::timeout(limit, fut) => match result {
            Ok(inner) => inner,
            Err(_) => Err(PipelineError::TimedOut { operation, timeout: limit }),
        },
    }
}

/// Spawn `program` with `args`, capturing stdout and stderr.
///
/// A non-zero exit is not an error here; callers map it to their own failure
/// with the captured stderr.
pub(crate) async fn run_tool(
    operation: &'static str,
    program: &str,
    args: Vec<OsString>,
    limit: Duration,
    cancel: &CancellationToken,
) -> PipelineResult<Output> {
    let mut command = Command::new(program);
    command
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    run_bounded(operation, limit, cancel, async move {
        command
            .output()
            .await
            .map_err(|source| PipelineError::ProcessSpawn {
                program: program.to_string(),
                source,
            })
    })
    .await
}
