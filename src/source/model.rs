// src/source/model.rs

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::task::ParamValue;

/// One task-definition file.
///
/// ```toml
/// [[task]]
/// description = "Nightly backup"
/// command = "/usr/bin/backup"
/// parameters = ["-v", { "--level" = 3 }]
/// every = "daily"
/// at = "02:30"
/// prevent_overlapping = true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskFile {
    #[serde(default)]
    pub task: Vec<TaskDef>,
}

/// `[[task]]` table. Exactly one of `command` / `callable` is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDef {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub command: Option<String>,

    /// Parameters appended to `command`, in order.
    #[serde(default)]
    pub parameters: Vec<ParamDef>,

    /// Name of a callable registered by the host binary.
    #[serde(default)]
    pub callable: Option<String>,

    /// Arguments passed to `callable`.
    #[serde(default)]
    pub args: Vec<String>,

    /// Full five-field expression.
    #[serde(default)]
    pub cron: Option<String>,

    /// Frequency shortcut name, e.g. `"daily"` or `"every_five_minutes"`.
    #[serde(default)]
    pub every: Option<String>,

    /// Day-of-week list applied after `cron` / `every`.
    #[serde(default)]
    pub days: Option<String>,

    /// `HH:MM` applied last.
    #[serde(default)]
    pub at: Option<String>,

    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default)]
    pub from: Option<String>,

    #[serde(default)]
    pub to: Option<String>,

    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub prevent_overlapping: bool,

    #[serde(default)]
    pub lock_ttl: Option<String>,

    #[serde(default)]
    pub ping_before: Option<String>,

    #[serde(default)]
    pub ping_after: Option<String>,

    #[serde(default)]
    pub output: Option<PathBuf>,

    #[serde(default)]
    pub append_output: bool,

    #[serde(default)]
    pub capture_output: Option<bool>,

    #[serde(default)]
    pub mail_output: bool,

    #[serde(default)]
    pub mail_errors: bool,

    #[serde(default)]
    pub when: OneOrMany<PredicateDef>,

    #[serde(default)]
    pub skip: OneOrMany<PredicateDef>,
}

/// A parameter: a bare value, or a table `{ "--key" = value }`.
/// Tables with several entries expand in the order they are written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamDef {
    Positional(ParamValue),
    Named(IndexMap<String, ParamValue>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateKeyword {
    Always,
    Never,
}

/// `"always"`, `"never"` or `{ between = ["08:00", "18:00"] }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PredicateDef {
    Keyword(PredicateKeyword),
    Between { between: [String; 2] },
}

/// A single value or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}
