// src/engine/runner.rs

//! Runs selected tasks as concurrent OS processes.
//!
//! One invocation goes through three phases:
//! 1. dispatch: build the command line, before hooks, spawn;
//! 2. poll: check every running handle, sleep `poll_interval`, repeat;
//! 3. finalize (per task, as soon as it exits): release the lock, after
//!    hooks, output persistence, mail.
//!
//! A failure in one task (build error, spawn error, hook error, non-zero
//! exit) never touches its siblings. There is no kill or deadline: a hung
//! process keeps the runner polling.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::engine::output::{self, Mailer, OutputSinks};
use crate::engine::pinger::Pinger;
use crate::engine::{BatchReport, TaskReport, TaskStatus};
use crate::errors::CadenceError;
use crate::exec::{CommandBuilder, ProcessHandle};
use crate::task::Task;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct Runner {
    builder: CommandBuilder,
    clock: Arc<dyn Clock>,
    pinger: Arc<dyn Pinger>,
    mailer: Option<Arc<dyn Mailer>>,
    sinks: OutputSinks,
    poll_interval: Duration,
}

struct Running<'a> {
    slot: usize,
    task: &'a Task,
    handle: ProcessHandle,
}

impl Runner {
    pub fn new(builder: CommandBuilder, clock: Arc<dyn Clock>, pinger: Arc<dyn Pinger>) -> Self {
        Self {
            builder,
            clock,
            pinger,
            mailer: None,
            sinks: OutputSinks::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn with_sinks(mut self, sinks: OutputSinks) -> Self {
        self.sinks = sinks;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run every task in `tasks` and wait for all of them.
    ///
    /// Tasks are expected to be already selected (and to hold their overlap
    /// locks, if any).
    pub async fn run(&self, tasks: &[&Task]) -> BatchReport {
        let mut reports: Vec<Option<TaskReport>> = vec![None; tasks.len()];
        let mut running = Vec::with_capacity(tasks.len());

        for (slot, task) in tasks.iter().copied().enumerate() {
            match self.dispatch(task).await {
                Ok(handle) => running.push(Running { slot, task, handle }),
                Err(report) => reports[slot] = Some(report),
            }
        }

        info!(
            started = running.len(),
            not_started = tasks.len() - running.len(),
            "tasks dispatched"
        );

        while !running.is_empty() {
            let mut still_running = Vec::with_capacity(running.len());

            for mut entry in running.drain(..) {
                let exit_code = match entry.handle.try_finish() {
                    Ok(false) => {
                        still_running.push(entry);
                        continue;
                    }
                    Ok(true) => entry.handle.exit_code().unwrap_or(-1),
                    Err(err) => {
                        error!(task = %entry.task.id(), error = %err, "lost track of task process");
                        -1
                    }
                };
                let report = self.finalize(entry.task, &entry.handle, exit_code).await;
                reports[entry.slot] = Some(report);
            }

            running = still_running;
            if !running.is_empty() {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        BatchReport {
            reports: reports.into_iter().flatten().collect(),
        }
    }

    async fn dispatch(&self, task: &Task) -> std::result::Result<ProcessHandle, TaskReport> {
        let line = match self.builder.build(task) {
            Ok(line) => line,
            Err(err) => return Err(self.not_started(task, &err)),
        };

        self.run_before_hooks(task).await;

        info!(task = %task.id(), command = %line, "starting task");
        ProcessHandle::spawn(
            self.builder.platform(),
            &line,
            task.captures_output(),
            self.clock.now(),
        )
        .map_err(|err| self.not_started(task, &err))
    }

    fn not_started(&self, task: &Task, err: &CadenceError) -> TaskReport {
        error!(task = %task.id(), error = %err, "task not started");
        task.release_lock();
        TaskReport {
            task_id: task.id().to_string(),
            status: TaskStatus::NotStarted {
                reason: err.to_string(),
            },
            command_line: None,
            exit_code: None,
            output: String::new(),
            started_at: None,
            finished_at: self.clock.now(),
        }
    }

    async fn finalize(&self, task: &Task, handle: &ProcessHandle, exit_code: i32) -> TaskReport {
        task.release_lock();

        let output = handle.whole_output();
        let status = TaskStatus::from_exit_code(exit_code);
        let finished_at = self.clock.now();

        if status.is_success() {
            info!(task = %task.id(), exit_code, "task finished");
        } else {
            warn!(task = %task.id(), exit_code, "task failed");
        }

        self.run_after_hooks(task).await;
        self.persist_output(task, &output, exit_code, finished_at).await;
        self.send_mail(task, &output, exit_code);

        TaskReport {
            task_id: task.id().to_string(),
            status,
            command_line: Some(handle.command_line().to_string()),
            exit_code: Some(exit_code),
            output,
            started_at: Some(handle.started_at()),
            finished_at,
        }
    }

    async fn run_before_hooks(&self, task: &Task) {
        let hooks = task.hooks();
        if let Some(url) = &hooks.ping_before {
            self.ping(task, url, "before").await;
        }
        if let Some(callback) = &hooks.before {
            if let Err(err) = callback.invoke() {
                warn!(task = %task.id(), error = %err, "before callback failed");
            }
        }
    }

    async fn run_after_hooks(&self, task: &Task) {
        let hooks = task.hooks();
        if let Some(callback) = &hooks.after {
            if let Err(err) = callback.invoke() {
                warn!(task = %task.id(), error = %err, "after callback failed");
            }
        }
        if let Some(url) = &hooks.ping_after {
            self.ping(task, url, "after").await;
        }
    }

    async fn ping(&self, task: &Task, url: &str, phase: &str) {
        match self.pinger.ping(url).await {
            Ok(()) => debug!(task = %task.id(), url, phase, "ping sent"),
            Err(err) => warn!(task = %task.id(), url, phase, error = %err, "ping failed"),
        }
    }

    async fn persist_output(
        &self,
        task: &Task,
        output: &str,
        exit_code: i32,
        finished_at: chrono::DateTime<chrono::Utc>,
    ) {
        if !task.captures_output() {
            return;
        }

        if let Some(target) = task.output_target() {
            if let Err(err) = output::write_target(target, output).await {
                warn!(task = %task.id(), path = %target.path.display(), error = %err, "failed to write task output");
            }
        }

        let entry = format!(
            "[{}] {} exited with {exit_code}\n{output}\n",
            finished_at.to_rfc3339(),
            task.id()
        );

        if let Some(path) = &self.sinks.output_log_file {
            if let Err(err) = output::append_log(path, &entry).await {
                warn!(task = %task.id(), path = %path.display(), error = %err, "failed to append output log");
            }
        }
        if exit_code != 0 {
            if let Some(path) = &self.sinks.errors_log_file {
                if let Err(err) = output::append_log(path, &entry).await {
                    warn!(task = %task.id(), path = %path.display(), error = %err, "failed to append errors log");
                }
            }
        }
    }

    fn send_mail(&self, task: &Task, output: &str, exit_code: i32) {
        let hooks = task.hooks();
        if !hooks.mail_output && !hooks.mail_errors {
            return;
        }
        let Some(mailer) = &self.mailer else {
            debug!(task = %task.id(), "mail requested but no mailer configured");
            return;
        };

        if hooks.mail_output {
            let subject = format!("cadence: output of {}", task.id());
            if let Err(err) = mailer.send(self.sinks.email_output.as_deref(), &subject, output) {
                warn!(task = %task.id(), error = %err, "failed to mail task output");
            }
        }
        if hooks.mail_errors && exit_code != 0 {
            let subject = format!("cadence: {} failed with exit code {exit_code}", task.id());
            if let Err(err) = mailer.send(self.sinks.email_errors.as_deref(), &subject, output) {
                warn!(task = %task.id(), error = %err, "failed to mail task error");
            }
        }
    }
}
