// src/task/set.rs

//! Ordered task collection and 1-based task numbers.

use std::fmt;
use std::str::FromStr;

use crate::errors::{CadenceError, Result};
use crate::task::Task;

/// Tasks in registration order. Numbering (as shown by `cadence list`) is
/// the position plus one.
#[derive(Debug, Default)]
pub struct TaskSet {
    tasks: Vec<Task>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Tasks paired with their display number.
    pub fn numbered(&self) -> impl Iterator<Item = (TaskNumber, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| (TaskNumber(idx + 1), task))
    }

    pub fn get(&self, number: TaskNumber) -> Result<&Task> {
        self.tasks.get(number.as_index()).ok_or_else(|| {
            CadenceError::TaskNumber(format!(
                "Task with number '{number}' not found. Total tasks: {}.",
                self.tasks.len()
            ))
        })
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }
}

impl FromIterator<Task> for TaskSet {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

impl Extend<Task> for TaskSet {
    fn extend<I: IntoIterator<Item = Task>>(&mut self, iter: I) {
        self.tasks.extend(iter);
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

/// A 1-based position in a [`TaskSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskNumber(usize);

impl TaskNumber {
    pub fn new(number: usize) -> Result<Self> {
        if number < 1 {
            return Err(CadenceError::TaskNumber(
                "Passed task number must be greater or equal to 1.".to_string(),
            ));
        }
        Ok(Self(number))
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn as_index(self) -> usize {
        self.0 - 1
    }
}

impl FromStr for TaskNumber {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        // Negative input is numeric but below range.
        let value: i64 = trimmed.parse().map_err(|_| {
            CadenceError::TaskNumber(format!("Task number '{s}' is not numeric."))
        })?;
        if value < 1 {
            return Err(CadenceError::TaskNumber(
                "Passed task number must be greater or equal to 1.".to_string(),
            ));
        }
        Self::new(value as usize)
    }
}

impl fmt::Display for TaskNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
