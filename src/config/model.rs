// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::errors::{CadenceError, Result};
use crate::types::LockStoreKind;

/// Configuration file as read from TOML, before validation.
///
/// ```toml
/// [config]
/// source = "tasks"
/// suffix = "Tasks.toml"
/// timezone = "Europe/Warsaw"
/// poll_interval = "20ms"
/// log_errors = true
/// errors_log_file = "/var/log/cadence-errors.log"
///
/// [lock]
/// store = "file"
/// dir = ".cadence/locks"
/// ttl = "24h"
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: RawConfigSection,

    #[serde(default)]
    pub lock: RawLockSection,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigSection {
    /// Directory searched (recursively) for task-definition files.
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// File-name suffix identifying task-definition files.
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// IANA timezone used to evaluate tasks without their own timezone.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Binary that callable tasks run as `<host_binary> invoke <token>`.
    /// Defaults to the running executable.
    #[serde(default)]
    pub host_binary: Option<PathBuf>,

    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    #[serde(default)]
    pub log_output: bool,

    #[serde(default)]
    pub output_log_file: Option<PathBuf>,

    #[serde(default)]
    pub log_errors: bool,

    #[serde(default)]
    pub errors_log_file: Option<PathBuf>,

    /// Recipient for `mail_output` tasks.
    #[serde(default)]
    pub email_output: Option<String>,

    /// Recipient for `mail_errors` tasks.
    #[serde(default)]
    pub email_errors: Option<String>,
}

impl Default for RawConfigSection {
    fn default() -> Self {
        Self {
            source: default_source(),
            suffix: default_suffix(),
            timezone: None,
            host_binary: None,
            poll_interval: default_poll_interval(),
            log_output: false,
            output_log_file: None,
            log_errors: false,
            errors_log_file: None,
            email_output: None,
            email_errors: None,
        }
    }
}

/// `[lock]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLockSection {
    /// `"file"` (default) or `"memory"`.
    #[serde(default)]
    pub store: LockStoreKind,

    /// Marker directory for the file store.
    #[serde(default = "default_lock_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_lock_ttl")]
    pub ttl: String,
}

impl Default for RawLockSection {
    fn default() -> Self {
        Self {
            store: LockStoreKind::default(),
            dir: default_lock_dir(),
            ttl: default_lock_ttl(),
        }
    }
}

fn default_source() -> PathBuf {
    PathBuf::from("tasks")
}

fn default_suffix() -> String {
    "Tasks.toml".to_string()
}

fn default_poll_interval() -> String {
    "20ms".to_string()
}

fn default_lock_dir() -> PathBuf {
    PathBuf::from(".cadence/locks")
}

fn default_lock_ttl() -> String {
    "24h".to_string()
}

/// Validated configuration with typed values.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub lock: LockSection,
}

#[derive(Debug, Clone)]
pub struct ConfigSection {
    pub source: PathBuf,
    pub suffix: String,
    pub timezone: Option<Tz>,
    pub host_binary: Option<PathBuf>,
    pub poll_interval: Duration,
    /// Set only when `log_output` is on.
    pub output_log_file: Option<PathBuf>,
    /// Set only when `log_errors` is on.
    pub errors_log_file: Option<PathBuf>,
    pub email_output: Option<String>,
    pub email_errors: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LockSection {
    pub store: LockStoreKind,
    pub dir: PathBuf,
    pub ttl: Duration,
}

impl ConfigFile {
    /// The comparison timezone. `run` and `info` cannot work without one.
    pub fn timezone(&self) -> Result<Tz> {
        self.config.timezone.ok_or_else(|| {
            CadenceError::Config(
                "Timezone must be configured. Please add it to your config file.".to_string(),
            )
        })
    }

    /// Binary used for callable tasks.
    pub fn host_binary(&self) -> Result<PathBuf> {
        match &self.config.host_binary {
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_exe()?),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            config: ConfigSection {
                source: default_source(),
                suffix: default_suffix(),
                timezone: None,
                host_binary: None,
                poll_interval: Duration::from_millis(20),
                output_log_file: None,
                errors_log_file: None,
                email_output: None,
                email_errors: None,
            },
            lock: LockSection {
                store: LockStoreKind::default(),
                dir: default_lock_dir(),
                ttl: crate::lock::DEFAULT_LOCK_TTL,
            },
        }
    }
}
