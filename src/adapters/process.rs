//! Bounded-time subprocess runner shared by the command-backed adapters.
//!
//! Each call spins up a current-thread tokio runtime, spawns the program
//! directly (no shell), feeds `stdin` while collecting stdout/stderr, and
//! gives up once the deadline passes.  On Unix the child leads its own
//! process group: a terminal Ctrl-C reaches the controller only, and a
//! timeout kills the whole group so helpers the child forked (an `ffmpeg`,
//! a detector wrapper, `sh` pipelines) never outlive the call.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use log::{trace, warn};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Completed run of a child process.
#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Trimmed stderr, or the exit status when stderr is empty.
    pub fn failure_reason(&self) -> String {
        let stderr = String::from_utf8_lossy(&self.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            self.status.to_string()
        } else {
            stderr.to_string()
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum RunError {
    #[error("cannot spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
    #[error("{program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Run `program args…` to completion or until `timeout` elapses.
pub(crate) fn run(
    program: &str,
    args: &[String],
    stdin: Option<&[u8]>,
    timeout: Duration,
) -> Result<CommandOutput, RunError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| RunError::Io {
            program: program.to_string(),
            source,
        })?;
    runtime.block_on(run_async(program, args, stdin, timeout))
}

async fn run_async(
    program: &str,
    args: &[String],
    stdin: Option<&[u8]>,
    timeout: Duration,
) -> Result<CommandOutput, RunError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    {
        cmd.process_group(0);
    }

    trace!("exec: {} {}", program, args.join(" "));
    let mut child = cmd.spawn().map_err(|source| RunError::Spawn {
        program: program.to_string(),
        source,
    })?;
    let pid = child.id();

    let pipe = child.stdin.take();
    let feed = async move {
        if let (Some(mut pipe), Some(data)) = (pipe, stdin) {
            // Broken pipe (child exited without reading) is ignored.
            let _ = pipe.write_all(data).await;
        }
    };
    let finished = async move {
        let (output, ()) = tokio::join!(child.wait_with_output(), feed);
        output
    };

    match tokio::time::timeout(timeout, finished).await {
        Ok(Ok(output)) => Ok(CommandOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        }),
        Ok(Err(source)) => Err(RunError::Io {
            program: program.to_string(),
            source,
        }),
        Err(_) => {
            // Dropping the child already killed the leader.
            if let Some(pid) = pid {
                kill_group(pid).await;
            }
            Err(RunError::TimedOut {
                program: program.to_string(),
                timeout,
            })
        }
    }
}

/// SIGKILL every process in the group led by `pgid`.
#[cfg(unix)]
async fn kill_group(pgid: u32) {
    let target = format!("-{}", pgid);
    let status = Command::new("kill")
        .args(["-KILL", "--", target.as_str()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    match status {
        Ok(s) if s.success() => trace!("killed process group {}", pgid),
        Ok(s) => trace!("process group {} already gone ({})", pgid, s),
        Err(e) => warn!("cannot kill process group {}: {}", pgid, e),
    }
}

#[cfg(not(unix))]
async fn kill_group(_pgid: u32) {}
