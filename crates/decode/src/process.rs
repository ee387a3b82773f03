use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// What a decoder process printed before exiting.
#[derive(Debug)]
pub(crate) struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
}

/// Runs `program` to completion, giving up after `budget`.
///
/// Returns `Ok(None)` when the budget elapses. The child is spawned with
/// `kill_on_drop`, so dropping the timed-out future also kills the process
/// instead of leaving a scanner burning CPU in the background.
pub(crate) async fn run<I, S>(program: &Path, args: I, budget: Duration) -> Result<Option<Captured>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .or_raise(|| ErrorKind::Spawn(program.display().to_string()))?;
    match tokio::time::timeout(budget, child.wait_with_output()).await {
        Ok(output) => {
            let output = output.or_raise(|| ErrorKind::Io)?;
            if !output.stderr.is_empty() {
                tracing::trace!(stderr = %String::from_utf8_lossy(&output.stderr), "Decoder wrote to stderr");
            }
            Ok(Some(Captured {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            }))
        },
        Err(_) => {
            tracing::warn!(
                program = %program.display(),
                budget_ms = budget.as_millis(),
                "Decoder exceeded its scan budget; killed"
            );
            Ok(None)
        },
    }
}

/// Decoders print nothing (or only whitespace) when no symbol was found.
pub(crate) fn non_empty(stdout: String) -> Option<String> {
    match stdout.trim().is_empty() {
        true => None,
        false => Some(stdout),
    }
}
