// src/config/validate.rs

use chrono_tz::Tz;

use crate::config::model::{ConfigFile, ConfigSection, LockSection, RawConfigFile};
use crate::errors::{CadenceError, Result};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CadenceError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let timezone = parse_timezone(raw.config.timezone.as_deref())?;

        let poll_interval = parse_duration(&raw.config.poll_interval)
            .map_err(|e| CadenceError::Config(format!("[config].poll_interval: {e}")))?;
        if poll_interval.is_zero() {
            return Err(CadenceError::Config(
                "[config].poll_interval must be greater than zero".to_string(),
            ));
        }

        let output_log_file = enabled_log_file(
            raw.config.log_output,
            raw.config.output_log_file,
            "log_output",
            "output_log_file",
        )?;
        let errors_log_file = enabled_log_file(
            raw.config.log_errors,
            raw.config.errors_log_file,
            "log_errors",
            "errors_log_file",
        )?;

        if raw.config.suffix.trim().is_empty() {
            return Err(CadenceError::Config(
                "[config].suffix cannot be empty".to_string(),
            ));
        }

        let ttl = parse_duration(&raw.lock.ttl)
            .map_err(|e| CadenceError::Config(format!("[lock].ttl: {e}")))?;

        Ok(ConfigFile {
            config: ConfigSection {
                source: raw.config.source,
                suffix: raw.config.suffix,
                timezone,
                host_binary: raw.config.host_binary,
                poll_interval,
                output_log_file,
                errors_log_file,
                email_output: non_empty(raw.config.email_output),
                email_errors: non_empty(raw.config.email_errors),
            },
            lock: LockSection {
                store: raw.lock.store,
                dir: raw.lock.dir,
                ttl,
            },
        })
    }
}

/// An absent or blank name means "not configured"; anything else must be a
/// known IANA zone.
pub fn parse_timezone(name: Option<&str>) -> Result<Option<Tz>> {
    match name.map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => name
            .parse::<Tz>()
            .map(Some)
            .map_err(|_| CadenceError::Config(format!("invalid timezone '{name}'"))),
    }
}

fn enabled_log_file(
    enabled: bool,
    path: Option<std::path::PathBuf>,
    flag: &str,
    key: &str,
) -> Result<Option<std::path::PathBuf>> {
    if !enabled {
        return Ok(None);
    }
    match path {
        Some(path) if !path.as_os_str().is_empty() => Ok(Some(path)),
        _ => Err(CadenceError::Config(format!(
            "[config].{flag} is enabled but [config].{key} is not set"
        ))),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
