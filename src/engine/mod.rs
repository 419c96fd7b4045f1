// src/engine/mod.rs

//! Orchestration engine for cadence.
//!
//! - [`selection`] decides which tasks are due for this invocation.
//! - [`runner`] starts them, polls them to completion and finalizes each
//!   one independently.
//! - [`pinger`] and [`output`] are the runner's outward-facing side effects.

use chrono::{DateTime, Utc};

pub mod output;
pub mod pinger;
pub mod runner;
pub mod selection;

pub use output::{Mailer, OutputSinks};
pub use pinger::{HttpPinger, Pinger};
pub use runner::Runner;
pub use selection::{Selection, select_due};

/// How one task's run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Command could not be built or spawned; nothing ran.
    NotStarted { reason: String },
    Succeeded,
    Failed { exit_code: i32 },
}

impl TaskStatus {
    pub fn from_exit_code(exit_code: i32) -> Self {
        if exit_code == 0 {
            TaskStatus::Succeeded
        } else {
            TaskStatus::Failed { exit_code }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Succeeded)
    }
}

#[derive(Debug, Clone)]
pub struct TaskReport {
    pub task_id: String,
    pub status: TaskStatus,
    /// Full command line, when it could be built.
    pub command_line: Option<String>,
    pub exit_code: Option<i32>,
    /// Stdout followed by stderr; empty when output is not captured.
    pub output: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: DateTime<Utc>,
}

/// One report per task handed to [`Runner::run`], in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub reports: Vec<TaskReport>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn get(&self, task_id: &str) -> Option<&TaskReport> {
        self.reports.iter().find(|r| r.task_id == task_id)
    }

    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.status.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, TaskStatus::Failed { .. }))
            .count()
    }

    pub fn not_started(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, TaskStatus::NotStarted { .. }))
            .count()
    }
}
