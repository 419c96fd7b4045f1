#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cadence::config::{ConfigFile, RawConfigFile};
use cadence::types::LockStoreKind;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn timezone(mut self, tz: &str) -> Self {
        self.config.config.timezone = Some(tz.to_string());
        self
    }

    pub fn source(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.config.source = dir.as_ref().to_path_buf();
        self
    }

    pub fn suffix(mut self, suffix: &str) -> Self {
        self.config.config.suffix = suffix.to_string();
        self
    }

    pub fn memory_locks(mut self) -> Self {
        self.config.lock.store = LockStoreKind::Memory;
        self
    }

    pub fn lock_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.lock.store = LockStoreKind::File;
        self.config.lock.dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn output_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config.log_output = true;
        self.config.config.output_log_file = Some(path.into());
        self
    }

    pub fn errors_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config.log_errors = true;
        self.config.config.errors_log_file = Some(path.into());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the TOML text of one `[[task]]` table.
///
/// Values are written as raw TOML, so strings must carry their own quotes
/// when added through [`TaskTableBuilder::raw`].
#[derive(Debug, Clone)]
pub struct TaskTableBuilder {
    lines: Vec<String>,
}

impl TaskTableBuilder {
    pub fn command(cmd: &str) -> Self {
        Self {
            lines: vec![format!("command = {}", quoted(cmd))],
        }
    }

    pub fn callable(name: &str) -> Self {
        Self {
            lines: vec![format!("callable = {}", quoted(name))],
        }
    }

    /// Set a string-valued key.
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.lines.push(format!("{key} = {}", quoted(value)));
        self
    }

    /// Set a key to a raw TOML value (`true`, `3`, `["a"]`, `{ between = [..] }`).
    pub fn raw(mut self, key: &str, toml_value: &str) -> Self {
        self.lines.push(format!("{key} = {toml_value}"));
        self
    }

    pub fn to_toml(&self) -> String {
        format!("[[task]]\n{}\n", self.lines.join("\n"))
    }
}

/// Concatenate tables into one task file.
pub fn task_file(tables: &[TaskTableBuilder]) -> String {
    tables
        .iter()
        .map(TaskTableBuilder::to_toml)
        .collect::<Vec<_>>()
        .join("\n")
}

fn quoted(value: &str) -> String {
    format!("'{value}'")
}
