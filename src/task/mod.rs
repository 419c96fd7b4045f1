// src/task/mod.rs

//! Schedulable tasks.
//!
//! - [`command`] describes what a task runs.
//! - [`window`] holds the optional `from` / `to` validity bounds.
//! - [`predicate`] holds `when` / `skip` conditions.
//! - [`hooks`] holds before/after pings and callbacks.
//! - [`frequency`] adds cron shortcuts such as `daily_at("13:00")`.
//! - [`set`] is the ordered collection handed to the runner.

pub mod command;
pub mod frequency;
pub mod hooks;
pub mod predicate;
pub mod set;
pub mod window;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use chrono_tz::Tz;
use tracing::{debug, trace};

use crate::cron::CronRule;
use crate::errors::{CadenceError, Result};
use crate::lock::{DEFAULT_LOCK_TTL, LockStore, OverlapGuard};

pub use command::{CommandSpec, Invocable, Param, ParamValue, TaskKind};
pub use hooks::{Callback, Hooks};
pub use predicate::Predicate;
pub use set::{TaskNumber, TaskSet};
pub use window::{Bound, ValidityWindow};

/// Whether a predicate must hold (`when`) or must not hold (`skip`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    When,
    Skip,
}

/// Where captured output is written after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub append: bool,
}

#[derive(Debug)]
pub struct Task {
    id: String,
    kind: TaskKind,
    description: Option<String>,
    cron: CronRule,
    timezone: Option<Tz>,
    window: ValidityWindow,
    conditions: Vec<(Condition, Predicate)>,
    overlap: Option<OverlapGuard>,
    working_dir: Option<PathBuf>,
    user: Option<String>,
    hooks: Hooks,
    capture_output: bool,
    output: Option<OutputTarget>,
    lock_held: AtomicBool,
}

impl Task {
    pub fn new(id: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            id: id.into(),
            kind,
            description: None,
            cron: CronRule::default(),
            timezone: None,
            window: ValidityWindow::default(),
            conditions: Vec::new(),
            overlap: None,
            working_dir: None,
            user: None,
            hooks: Hooks::default(),
            capture_output: true,
            output: None,
            lock_held: AtomicBool::new(false),
        }
    }

    /// Task running a literal command.
    pub fn command(id: impl Into<String>, spec: impl Into<CommandSpec>) -> Self {
        Self::new(id, TaskKind::Command(spec.into()))
    }

    /// Task running a registered in-process callable in a fresh process.
    pub fn callable(id: impl Into<String>, invocable: Invocable) -> Self {
        Self::new(id, TaskKind::Callable(invocable))
    }

    // ----- builder -------------------------------------------------------

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the whole cron expression.
    pub fn cron(mut self, expression: &str) -> Result<Self> {
        self.cron = CronRule::parse(expression)?;
        Ok(self)
    }

    pub fn with_rule(mut self, rule: CronRule) -> Self {
        self.cron = rule;
        self
    }

    pub fn timezone(mut self, tz: Tz) -> Self {
        self.timezone = Some(tz);
        self
    }

    pub fn from(mut self, bound: &str) -> Result<Self> {
        self.window.from = Some(bound.parse()?);
        Ok(self)
    }

    pub fn to(mut self, bound: &str) -> Result<Self> {
        self.window.to = Some(bound.parse()?);
        Ok(self)
    }

    pub fn between(self, from: &str, to: &str) -> Result<Self> {
        self.from(from)?.to(to)
    }

    pub fn when(mut self, predicate: Predicate) -> Self {
        self.conditions.push((Condition::When, predicate));
        self
    }

    pub fn skip(mut self, predicate: Predicate) -> Self {
        self.conditions.push((Condition::Skip, predicate));
        self
    }

    /// Enable overlap prevention with the default TTL.
    pub fn prevent_overlapping(mut self, store: Arc<dyn LockStore>) -> Self {
        let ttl = self
            .overlap
            .as_ref()
            .map(OverlapGuard::ttl)
            .unwrap_or(DEFAULT_LOCK_TTL);
        self.overlap = Some(OverlapGuard::new(store, ttl));
        self
    }

    /// Lock lifetime. Has no effect until overlap prevention is enabled.
    pub fn lock_ttl(mut self, ttl: Duration) -> Self {
        self.overlap = self.overlap.map(|guard| guard.with_ttl(ttl));
        self
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn ping_before(mut self, url: &str) -> Result<Self> {
        self.hooks.ping_before = Some(check_url(url)?);
        Ok(self)
    }

    pub fn then_ping(mut self, url: &str) -> Result<Self> {
        self.hooks.ping_after = Some(check_url(url)?);
        Ok(self)
    }

    pub fn before(mut self, callback: Callback) -> Self {
        self.hooks.before = Some(callback);
        self
    }

    pub fn after(mut self, callback: Callback) -> Self {
        self.hooks.after = Some(callback);
        self
    }

    pub fn mail_output(mut self, on: bool) -> Self {
        self.hooks.mail_output = on;
        self
    }

    pub fn mail_errors(mut self, on: bool) -> Self {
        self.hooks.mail_errors = on;
        self
    }

    pub fn capture_output(mut self, on: bool) -> Self {
        self.capture_output = on;
        self
    }

    /// Write captured output to `path` after each run (truncating).
    pub fn send_output_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(OutputTarget {
            path: path.into(),
            append: false,
        });
        self
    }

    /// Append captured output to `path` after each run.
    pub fn append_output_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(OutputTarget {
            path: path.into(),
            append: true,
        });
        self
    }

    // ----- accessors -----------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn rule(&self) -> &CronRule {
        &self.cron
    }

    pub fn expression(&self) -> String {
        self.cron.expression()
    }

    pub fn timezone_override(&self) -> Option<Tz> {
        self.timezone
    }

    pub fn window(&self) -> &ValidityWindow {
        &self.window
    }

    pub fn overlap(&self) -> Option<&OverlapGuard> {
        self.overlap.as_ref()
    }

    pub fn prevents_overlapping(&self) -> bool {
        self.overlap.is_some()
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn run_as_user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn captures_output(&self) -> bool {
        self.capture_output
    }

    pub fn output_target(&self) -> Option<&OutputTarget> {
        self.output.as_ref()
    }

    /// Timezone the cron rule and window are evaluated in.
    pub fn effective_timezone(&self, comparison: Tz) -> Tz {
        self.timezone.unwrap_or(comparison)
    }

    /// Stable identifier derived from what runs and when.
    ///
    /// Identical command + expression always give the same key, in any
    /// process; it doubles as the overlap-lock key.
    pub fn unique_key(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.cron.expression().as_bytes());
        hasher.update(&[0]);
        hasher.update(self.kind.fingerprint().as_bytes());
        format!("cadence-{}", hasher.finalize().to_hex())
    }

    // ----- evaluation ----------------------------------------------------

    /// Whether the task should run at `now`.
    ///
    /// Cron rule, validity window and predicates are checked first; only
    /// when all pass is the overlap lock attempted. A granted lock stays held
    /// until [`Task::release_lock`].
    pub fn is_due(&self, now: DateTime<Utc>, comparison: Tz) -> bool {
        let tz = self.effective_timezone(comparison);

        if !self.cron.is_due(now, tz) {
            trace!(task = %self.id, expression = %self.cron, "cron rule does not match");
            return false;
        }

        let minute = now.duration_trunc(TimeDelta::minutes(1)).unwrap_or(now);
        let local = minute.with_timezone(&tz).naive_local();

        if !self.window.contains(local) {
            debug!(task = %self.id, "outside validity window");
            return false;
        }

        if !self.predicates_pass(local.time()) {
            debug!(task = %self.id, "when/skip conditions not met");
            return false;
        }

        self.try_lock()
    }

    /// Forced evaluation: ignores schedule, window and predicates, but still
    /// honours overlap prevention.
    pub fn is_due_forced(&self) -> bool {
        self.try_lock()
    }

    /// Release the overlap lock if this instance holds it.
    pub fn release_lock(&self) {
        if !self.lock_held.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(guard) = &self.overlap {
            guard.release(&self.unique_key());
        }
    }

    pub fn holds_lock(&self) -> bool {
        self.lock_held.load(Ordering::SeqCst)
    }

    fn predicates_pass(&self, local_time: chrono::NaiveTime) -> bool {
        // Every predicate runs, in registration order.
        self.conditions
            .iter()
            .map(|(condition, predicate)| match condition {
                Condition::When => predicate.evaluate(local_time),
                Condition::Skip => !predicate.evaluate(local_time),
            })
            .fold(true, |pass, ok| pass && ok)
    }

    fn try_lock(&self) -> bool {
        let Some(guard) = &self.overlap else {
            return true;
        };
        if self.lock_held.load(Ordering::SeqCst) {
            return false;
        }
        let granted = guard.try_acquire(&self.unique_key());
        if granted {
            self.lock_held.store(true, Ordering::SeqCst);
        }
        granted
    }
}

fn check_url(url: &str) -> Result<String> {
    if url.trim().is_empty() {
        return Err(CadenceError::Config("Url cannot be empty.".to_string()));
    }
    Ok(url.to_string())
}
