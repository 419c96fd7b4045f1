// src/task/hooks.rs

//! Before/after hooks attached to a task.
//!
//! Hooks are best-effort: the runner logs their failures and carries on.

use std::fmt;
use std::sync::Arc;

/// A host function run before or after the task's process.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>);

impl Callback {
    pub fn new(f: impl Fn() -> anyhow::Result<()> + Send + Sync + 'static) -> Self {
        Callback(Arc::new(f))
    }

    pub fn invoke(&self) -> anyhow::Result<()> {
        (self.0)()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Hooks {
    /// URL pinged (HTTP GET) right before the process starts.
    pub ping_before: Option<String>,
    /// URL pinged after the process finished.
    pub ping_after: Option<String>,
    pub before: Option<Callback>,
    pub after: Option<Callback>,
    /// Mail the captured output after every run.
    pub mail_output: bool,
    /// Mail the captured output when the process exits non-zero.
    pub mail_errors: bool,
}

impl Hooks {
    pub fn has_before(&self) -> bool {
        self.ping_before.is_some() || self.before.is_some()
    }

    pub fn has_after(&self) -> bool {
        self.ping_after.is_some() || self.after.is_some()
    }
}
