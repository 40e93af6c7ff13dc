//! Subprocess launch and supervision.
//!
//! # Responsibilities
//! - Spawn the executable with a cleared, explicit environment
//! - Feed the request body to stdin from a separate task
//! - Read stdout in chunks and wait for exit under a deadline
//! - Terminate without blocking: kill, then reap in the background

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use axum::body::{Body, Bytes};
use futures_util::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};

use crate::dispatch::DispatchError;

/// Everything needed to launch one subprocess.
#[derive(Debug, Clone)]
pub struct ProcessInvocation {
    pub executable: PathBuf,
    /// Applied in order; on duplicate keys the last entry wins.
    pub env: Vec<(String, String)>,
    pub deadline: Instant,
}

impl ProcessInvocation {
    /// Launch the executable, wiring `stdin` to the given body.
    pub fn spawn(&self, stdin: Body) -> Result<RunningProcess, DispatchError> {
        let mut child = Command::new(&self.executable)
            .env_clear()
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DispatchError::Launch {
                executable: self.executable.display().to_string(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DispatchError::Io(io::Error::other("stdout was not captured")))?;

        let feeder = child
            .stdin
            .take()
            .map(|pipe| tokio::spawn(feed_stdin(stdin, pipe)));

        tracing::debug!(
            executable = %self.executable.display(),
            pid = ?child.id(),
            "Subprocess spawned"
        );

        Ok(RunningProcess {
            child,
            stdout,
            feeder,
            deadline: self.deadline,
        })
    }
}

/// Copy the request body into the child's stdin, then close it.
async fn feed_stdin(body: Body, mut pipe: ChildStdin) {
    let mut stream = body.into_data_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::debug!(error = %e, "Request body read failed");
                return;
            }
        };

        if let Err(e) = pipe.write_all(&chunk).await {
            // The child may exit without reading its input.
            tracing::debug!(error = %e, "Subprocess stdin closed early");
            return;
        }
    }
}

/// A spawned subprocess, exclusively owned by one dispatch.
#[derive(Debug)]
pub struct RunningProcess {
    child: Child,
    stdout: ChildStdout,
    feeder: Option<JoinHandle<()>>,
    deadline: Instant,
}

impl RunningProcess {
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Read the next stdout chunk. `None` means end of output.
    pub async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<Option<Bytes>, DispatchError> {
        match timeout_at(self.deadline, self.stdout.read(buf)).await {
            Err(_) => Err(DispatchError::Timeout),
            Ok(Err(e)) => Err(DispatchError::Io(e)),
            Ok(Ok(0)) => Ok(None),
            Ok(Ok(n)) => Ok(Some(Bytes::copy_from_slice(&buf[..n]))),
        }
    }

    /// Read stdout until end of output.
    pub async fn read_to_end(&mut self) -> Result<Bytes, DispatchError> {
        let mut output = Vec::new();
        match timeout_at(self.deadline, self.stdout.read_to_end(&mut output)).await {
            Err(_) => Err(DispatchError::Timeout),
            Ok(Err(e)) => Err(DispatchError::Io(e)),
            Ok(Ok(_)) => Ok(Bytes::from(output)),
        }
    }

    /// Wait for exit; a non-zero status is an error.
    pub async fn wait(&mut self) -> Result<(), DispatchError> {
        match timeout_at(self.deadline, self.child.wait()).await {
            Err(_) => Err(DispatchError::Timeout),
            Ok(Err(e)) => Err(DispatchError::Io(e)),
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => Err(DispatchError::Exit(status)),
        }
    }

    /// Give up the process once its result is known. Anything but a clean
    /// exit or an exit status leaves a live child, which is terminated.
    pub fn release(self, result: &Result<(), DispatchError>) {
        match result {
            Ok(()) | Err(DispatchError::Exit(_)) => self.finish(),
            Err(_) => self.terminate(),
        }
    }

    fn finish(self) {
        if let Some(feeder) = self.feeder {
            feeder.abort();
        }
    }

    /// Send a kill signal and return immediately. A detached task reaps the
    /// child so no zombie is left behind.
    pub fn terminate(self) {
        let RunningProcess {
            mut child, feeder, ..
        } = self;

        if let Some(feeder) = feeder {
            feeder.abort();
        }

        let pid = child.id();
        if let Err(e) = child.start_kill() {
            tracing::debug!(pid = ?pid, error = %e, "Kill failed, subprocess already gone");
        }

        tokio::spawn(async move {
            let status = child.wait().await;
            tracing::debug!(pid = ?pid, status = ?status, "Subprocess reaped");
        });
    }
}
