// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launches one child command through the platform shell, streaming its
//! stdout/stderr line-by-line to a caller-supplied sink, enforcing a
//! per-call timeout, and killing the whole process tree on timeout or
//! external cancellation.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

/// Which stream a captured line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    StdOut,
    StdErr,
}

/// Everything needed to launch one child command.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The full command line, handed to the platform shell verbatim.
    pub command: String,
    pub working_directory: Option<PathBuf>,
    pub environment: HashMap<String, String>,
    pub timeout: Duration,
}

/// Bounded wait for both output streams to drain after the child exits, so
/// that no output lines are lost to a race between EOF and process reaping.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RunError {
    #[error("process timed out after {0:?}")]
    Timeout(Duration),
    #[error("process was cancelled")]
    Cancelled,
    #[error("failed to launch process: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Run one command to completion, calling `on_line` synchronously for every
/// captured stdout/stderr line, in the order the two streams produced them.
///
/// Returns the child's exit code on normal completion. On timeout expiry or
/// on `cancel` firing, the whole process tree is killed and the call fails
/// with [`RunError::Timeout`] / [`RunError::Cancelled`].
pub async fn run(
    spec: CommandSpec,
    mut on_line: impl FnMut(OutputSource, String) + Send,
    cancel: oneshot::Receiver<()>,
) -> Result<i32, RunError> {
    let mut command = platform_shell_command(&spec.command);
    if let Some(dir) = &spec.working_directory {
        command.current_dir(dir);
    }
    command.envs(&spec.environment);
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(RunError::Spawn)?;
    let pid = child.id();
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunError::Spawn(std::io::Error::other("stdout was not piped")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RunError::Spawn(std::io::Error::other("stderr was not piped")))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(stream_lines(stdout, OutputSource::StdOut, tx.clone()));
    tokio::spawn(stream_lines(stderr, OutputSource::StdErr, tx.clone()));
    drop(tx);

    let deadline = tokio::time::Instant::now() + spec.timeout;
    let sleep = tokio::time::sleep_until(deadline);
    tokio::pin!(sleep);
    tokio::pin!(cancel);
    let wait = child.wait();
    tokio::pin!(wait);

    let outcome = loop {
        tokio::select! {
            biased;
            Some((source, line)) = rx.recv() => {
                on_line(source, line);
            }
            status = &mut wait => break Ok(status),
            _ = &mut sleep => break Err(RunError::Timeout(spec.timeout)),
            _ = &mut cancel => break Err(RunError::Cancelled),
        }
    };

    match outcome {
        Ok(status) => {
            drain_remaining(&mut rx, &mut on_line).await;
            Ok(status.code().unwrap_or(-1))
        }
        Err(err) => {
            if let Some(pid) = pid {
                kill_tree(pid);
            }
            let _ = tokio::time::timeout(DRAIN_GRACE, child.wait()).await;
            drain_remaining(&mut rx, &mut on_line).await;
            Err(err)
        }
    }
}

async fn drain_remaining(
    rx: &mut mpsc::UnboundedReceiver<(OutputSource, String)>,
    on_line: &mut impl FnMut(OutputSource, String),
) {
    let _ = tokio::time::timeout(DRAIN_GRACE, async {
        while let Some((source, line)) = rx.recv().await {
            on_line(source, line);
        }
    })
    .await;
}

fn platform_shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut c = Command::new("cmd");
        c.args(["/c", command]);
        c
    }
    #[cfg(not(windows))]
    {
        let mut c = Command::new("/bin/bash");
        c.args(["-c", command]);
        c
    }
}

async fn stream_lines<R: AsyncRead + Unpin>(
    reader: R,
    source: OutputSource,
    tx: mpsc::UnboundedSender<(OutputSource, String)>,
) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let trimmed = line.strip_suffix('\r').unwrap_or(&line).to_string();
                if tx.send((source, trimmed)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "error reading child output stream");
                break;
            }
        }
    }
}

#[cfg(unix)]
fn kill_tree(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;
    if killpg(Pid::from_raw(pid as i32), Signal::SIGKILL).is_err() {
        tracing::debug!(pid, "process group already gone");
    }
}

#[cfg(windows)]
fn kill_tree(pid: u32) {
    let _ = std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/T", "/F"])
        .output();
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
