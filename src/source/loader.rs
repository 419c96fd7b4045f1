// src/source/loader.rs

//! Build a [`TaskSet`] from task-definition files.
//!
//! Loading is pure data: files are parsed and validated, nothing they
//! describe is executed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::parse_timezone;
use crate::errors::{CadenceError, Result};
use crate::fs::FileSystem;
use crate::lock::LockStore;
use crate::source::finder::TaskFileFinder;
use crate::source::model::{ParamDef, PredicateDef, PredicateKeyword, TaskDef, TaskFile};
use crate::task::window::parse_time;
use crate::task::{CommandSpec, Invocable, Param, Predicate, Task, TaskSet};
use crate::types::parse_duration;

#[derive(Debug, Clone)]
pub struct TaskSource {
    fs: Arc<dyn FileSystem>,
    finder: TaskFileFinder,
    root: PathBuf,
    locks: Arc<dyn LockStore>,
    lock_ttl: Duration,
}

impl TaskSource {
    /// `lock_ttl` applies to tasks with `prevent_overlapping` and no
    /// `lock_ttl` of their own.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        suffix: &str,
        locks: Arc<dyn LockStore>,
        lock_ttl: Duration,
    ) -> Result<Self> {
        Ok(Self {
            fs,
            finder: TaskFileFinder::new(suffix)?,
            root: root.into(),
            locks,
            lock_ttl,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every task from every matching file, files in sorted path order and
    /// tasks in file order.
    pub fn load(&self) -> Result<TaskSet> {
        let files = self.finder.find(self.fs.as_ref(), &self.root)?;

        let mut set = TaskSet::new();
        for path in &files {
            set.extend(self.load_file(path)?);
        }

        info!(
            root = %self.root.display(),
            files = files.len(),
            tasks = set.len(),
            "task source loaded"
        );
        Ok(set)
    }

    pub fn load_file(&self, path: &Path) -> Result<Vec<Task>> {
        let source_error = |reason: String| CadenceError::TaskSource {
            path: path.display().to_string(),
            reason,
        };

        let contents = self
            .fs
            .read_to_string(path)
            .map_err(|e| source_error(format!("{e:#}")))?;
        let file: TaskFile = toml::from_str(&contents).map_err(|e| source_error(e.to_string()))?;

        let label = self.label_for(path);
        let mut tasks = Vec::with_capacity(file.task.len());
        for (idx, def) in file.task.into_iter().enumerate() {
            let id = format!("{label}#{}", idx + 1);
            let task = self
                .build_task(&id, def)
                .map_err(|e| source_error(format!("task #{}: {e}", idx + 1)))?;
            tasks.push(task);
        }

        debug!(path = %path.display(), tasks = tasks.len(), "task file parsed");
        Ok(tasks)
    }

    /// Turn one `[[task]]` table into a [`Task`].
    pub fn build_task(&self, id: &str, def: TaskDef) -> Result<Task> {
        let mut task = match (def.command, def.callable) {
            (Some(command), None) => {
                let mut spec = CommandSpec::new(command);
                spec.params = expand_params(def.parameters);
                Task::command(id, spec)
            }
            (None, Some(name)) => Task::callable(id, Invocable::new(name).with_args(def.args)),
            (Some(_), Some(_)) => {
                return Err(CadenceError::Config(
                    "`command` and `callable` are mutually exclusive".to_string(),
                ));
            }
            (None, None) => {
                return Err(CadenceError::Config(
                    "one of `command` or `callable` is required".to_string(),
                ));
            }
        };

        if let Some(description) = def.description {
            task = task.description(description);
        }

        if def.cron.is_some() && def.every.is_some() {
            return Err(CadenceError::Config(
                "`cron` and `every` are mutually exclusive".to_string(),
            ));
        }
        if let Some(expression) = def.cron {
            task = task.cron(&expression)?;
        }
        if let Some(every) = def.every {
            task = task.frequency(&every)?;
        }
        if let Some(days) = def.days {
            task = task.days(&days)?;
        }
        if let Some(at) = def.at {
            task = task.at(&at)?;
        }

        if let Some(tz) = parse_timezone(def.timezone.as_deref())? {
            task = task.timezone(tz);
        }
        if let Some(from) = def.from {
            task = task.from(&from)?;
        }
        if let Some(to) = def.to {
            task = task.to(&to)?;
        }

        for predicate in def.when.into_vec() {
            task = task.when(build_predicate(predicate)?);
        }
        for predicate in def.skip.into_vec() {
            task = task.skip(build_predicate(predicate)?);
        }

        if def.prevent_overlapping {
            let ttl = match def.lock_ttl {
                Some(raw) => parse_duration(&raw)
                    .map_err(|e| CadenceError::Config(format!("lock_ttl: {e}")))?,
                None => self.lock_ttl,
            };
            task = task
                .prevent_overlapping(Arc::clone(&self.locks))
                .lock_ttl(ttl);
        }

        if let Some(dir) = def.working_dir {
            task = task.in_dir(dir);
        }
        if let Some(user) = def.user {
            task = task.user(user);
        }
        if let Some(url) = def.ping_before {
            task = task.ping_before(&url)?;
        }
        if let Some(url) = def.ping_after {
            task = task.then_ping(&url)?;
        }
        if let Some(path) = def.output {
            task = if def.append_output {
                task.append_output_to(path)
            } else {
                task.send_output_to(path)
            };
        }
        if let Some(capture) = def.capture_output {
            task = task.capture_output(capture);
        }

        Ok(task.mail_output(def.mail_output).mail_errors(def.mail_errors))
    }

    fn label_for(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .ok()
            .filter(|rel| !rel.as_os_str().is_empty())
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

fn expand_params(defs: Vec<ParamDef>) -> Vec<Param> {
    let mut params = Vec::new();
    for def in defs {
        match def {
            ParamDef::Positional(value) => params.push(Param::Positional(value)),
            ParamDef::Named(pairs) => {
                params.extend(pairs.into_iter().map(|(key, value)| Param::Named(key, value)));
            }
        }
    }
    params
}

fn build_predicate(def: PredicateDef) -> Result<Predicate> {
    match def {
        PredicateDef::Keyword(PredicateKeyword::Always) => Ok(Predicate::Always),
        PredicateDef::Keyword(PredicateKeyword::Never) => Ok(Predicate::Never),
        PredicateDef::Between { between: [from, to] } => {
            let parse = |s: &str| {
                parse_time(s.trim()).ok_or_else(|| {
                    CadenceError::Config(format!("invalid time '{s}' in `between`; expected HH:MM"))
                })
            };
            Ok(Predicate::TimeBetween {
                from: parse(&from)?,
                to: parse(&to)?,
            })
        }
    }
}
