// src/exec/process.rs

//! A spawned task process.
//!
//! The handle owns the child and two reader tasks that drain stdout and
//! stderr into shared buffers as soon as the process starts, so a chatty
//! process never blocks on a full pipe. Completion is observed by polling
//! [`ProcessHandle::try_finish`]; the runner never blocks on a single child.
//!
//! A background child of the task may inherit the pipes and keep them open
//! after the task itself exited. Readers get [`OUTPUT_DRAIN_GRACE`] after
//! the exit to reach end of file; after that the handle completes with the
//! output read so far.

use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::exec::shell::Platform;

type Buffer = Arc<Mutex<Vec<u8>>>;

/// How long the readers may keep draining after the process exited.
pub const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct ProcessHandle {
    command_line: String,
    started_at: DateTime<Utc>,
    child: Child,
    exit_code: Option<i32>,
    exited_at: Option<Instant>,
    stdout: Buffer,
    stderr: Buffer,
    readers: Vec<JoinHandle<()>>,
}

impl ProcessHandle {
    /// Hand `command_line` to the platform shell and start draining its
    /// output. With `capture = false` output goes to the null device.
    pub fn spawn(
        platform: Platform,
        command_line: &str,
        capture: bool,
        started_at: DateTime<Utc>,
    ) -> Result<Self> {
        let mut cmd = platform.shell_command(command_line);
        if capture {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd.stdin(Stdio::null()).kill_on_drop(false);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning process for command '{command_line}'"))?;

        let stdout: Buffer = Arc::default();
        let stderr: Buffer = Arc::default();
        let mut readers = Vec::with_capacity(2);
        if let Some(out) = child.stdout.take() {
            readers.push(drain(out, Arc::clone(&stdout)));
        }
        if let Some(err) = child.stderr.take() {
            readers.push(drain(err, Arc::clone(&stderr)));
        }

        debug!(command = command_line, pid = ?child.id(), "process started");

        Ok(Self {
            command_line: command_line.to_string(),
            started_at,
            child,
            exit_code: None,
            exited_at: None,
            stdout,
            stderr,
            readers,
        })
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// `None` while the process is running.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn is_running(&self) -> bool {
        self.exit_code.is_none()
    }

    /// Non-blocking completion check. Returns `true` once the process has
    /// exited and both output streams have been fully read, or the drain
    /// grace has run out.
    ///
    /// A process killed by a signal reports exit code `-1`.
    pub fn try_finish(&mut self) -> Result<bool> {
        let exited_at = match self.exited_at {
            Some(at) => at,
            None => {
                let status = self.child.try_wait().with_context(|| {
                    format!("polling process for command '{}'", self.command_line)
                })?;
                let Some(status) = status else {
                    return Ok(false);
                };
                self.exit_code = Some(status.code().unwrap_or(-1));
                let now = Instant::now();
                self.exited_at = Some(now);
                now
            }
        };

        if self.readers.iter().all(|reader| reader.is_finished()) {
            self.readers.clear();
            return Ok(true);
        }
        if exited_at.elapsed() < OUTPUT_DRAIN_GRACE {
            return Ok(false);
        }

        warn!(
            command = %self.command_line,
            "output pipes still open after exit, keeping output read so far"
        );
        for reader in self.readers.drain(..) {
            reader.abort();
        }
        Ok(true)
    }

    pub fn stdout(&self) -> String {
        snapshot(&self.stdout)
    }

    pub fn stderr(&self) -> String {
        snapshot(&self.stderr)
    }

    /// Stdout followed by stderr.
    pub fn whole_output(&self) -> String {
        let mut out = self.stdout();
        out.push_str(&self.stderr());
        out
    }
}

fn drain<R>(mut reader: R, buffer: Buffer) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 4096];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => {
                    let mut guard = buffer.lock().unwrap_or_else(|e| e.into_inner());
                    guard.extend_from_slice(&chunk[..n]);
                }
                Err(err) => {
                    debug!(error = %err, "output pipe read failed");
                    break;
                }
            }
        }
    })
}

fn snapshot(buffer: &Buffer) -> String {
    let guard = buffer.lock().unwrap_or_else(|e| e.into_inner());
    String::from_utf8_lossy(&guard).into_owned()
}
