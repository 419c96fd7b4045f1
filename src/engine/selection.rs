// src/engine/selection.rs

//! Choose which tasks of a [`TaskSet`] run in this invocation.

use chrono_tz::Tz;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::errors::Result;
use crate::task::{Task, TaskNumber, TaskSet};

/// How the set is filtered before running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Ignore schedule, window and conditions. Overlap locks still apply.
    pub force: bool,
    /// Consider only this task.
    pub task: Option<TaskNumber>,
}

/// Tasks that are due now, in set order.
///
/// Every task returned with overlap prevention enabled holds its lock; the
/// runner releases it when the task finishes. An out-of-range task number
/// is an error.
pub fn select_due<'a>(
    set: &'a TaskSet,
    selection: Selection,
    clock: &dyn Clock,
    comparison: Tz,
) -> Result<Vec<&'a Task>> {
    let now = clock.now();

    let candidates: Vec<&Task> = match selection.task {
        Some(number) => vec![set.get(number)?],
        None => set.iter().collect(),
    };

    let due: Vec<&Task> = candidates
        .into_iter()
        .filter(|task| {
            let due = if selection.force {
                task.is_due_forced()
            } else {
                task.is_due(now, comparison)
            };
            debug!(task = %task.id(), due, force = selection.force, "task evaluated");
            due
        })
        .collect();

    info!(
        total = set.len(),
        due = due.len(),
        %now,
        timezone = %comparison,
        "task selection complete"
    );
    Ok(due)
}
