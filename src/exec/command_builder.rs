// src/exec/command_builder.rs

//! Turns a [`Task`] into the final shell command line.
//!
//! Layout: `[env directive <joiner>]... command`, where the directives are
//! an optional working-directory change, and every directive (plus the
//! command) gets a `sudo -u <user> ` prefix when the task runs as another
//! user. POSIX example:
//!
//! ```text
//! sudo -u john cd /var/test; sudo -u john php -i
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::{CadenceError, Result};
use crate::exec::marshal::{InvocableMarshaller, JsonMarshaller};
use crate::exec::shell::Platform;
use crate::task::{Task, TaskKind};

#[derive(Debug, Clone)]
pub struct CommandBuilder {
    platform: Platform,
    host_binary: PathBuf,
    marshaller: Arc<dyn InvocableMarshaller>,
}

impl CommandBuilder {
    pub fn new(platform: Platform, host_binary: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            host_binary: host_binary.into(),
            marshaller: Arc::new(JsonMarshaller::new()),
        }
    }

    pub fn with_marshaller(mut self, marshaller: Arc<dyn InvocableMarshaller>) -> Self {
        self.marshaller = marshaller;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Full command line, environment directives included.
    pub fn build(&self, task: &Task) -> Result<String> {
        let command = self.base_command(task)?;

        let mut directives = Vec::new();
        if let Some(dir) = task.working_dir() {
            directives.push(self.platform.change_dir(&dir.to_string_lossy()));
        }
        directives.push(command);

        if let Some(user) = task.run_as_user() {
            if self.platform == Platform::Windows {
                return Err(CadenceError::Environment(
                    "Changing user on Windows is not implemented.".to_string(),
                ));
            }
            let prefix = format!("sudo -u {} ", self.platform.quote_if_needed(user));
            directives = directives
                .into_iter()
                .map(|directive| format!("{prefix}{directive}"))
                .collect();
        }

        Ok(directives.join(self.platform.joiner()))
    }

    /// Command without environment directives, as shown by `list`.
    pub fn display_command(&self, task: &Task) -> String {
        task.kind().display(self.platform)
    }

    fn base_command(&self, task: &Task) -> Result<String> {
        match task.kind() {
            TaskKind::Command(spec) => Ok(spec.render(self.platform)),
            TaskKind::Callable(invocable) => {
                let token = self.marshaller.marshal(invocable)?;
                let binary = self
                    .platform
                    .quote_if_needed(&self.host_binary.to_string_lossy());
                Ok(format!("{binary} invoke {}", self.platform.quote(&token)))
            }
        }
    }
}
