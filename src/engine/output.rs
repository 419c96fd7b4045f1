// src/engine/output.rs

//! Where a finished task's captured output goes: the task's own output file,
//! the configured output / error logs, and mail.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::io::AsyncWriteExt;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::task::OutputTarget;

/// Mail delivery is supplied by the host; the runner only decides when to
/// send and what.
pub trait Mailer: Send + Sync + Debug {
    fn send(&self, recipient: Option<&str>, subject: &str, body: &str) -> Result<()>;
}

/// Log-file destinations from `[config]`.
#[derive(Debug, Clone, Default)]
pub struct OutputSinks {
    pub output_log_file: Option<PathBuf>,
    pub errors_log_file: Option<PathBuf>,
    pub email_output: Option<String>,
    pub email_errors: Option<String>,
}

impl OutputSinks {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            output_log_file: cfg.config.output_log_file.clone(),
            errors_log_file: cfg.config.errors_log_file.clone(),
            email_output: cfg.config.email_output.clone(),
            email_errors: cfg.config.email_errors.clone(),
        }
    }
}

/// Write `content` to a task's output target.
pub async fn write_target(target: &OutputTarget, content: &str) -> Result<()> {
    write_file(&target.path, content, target.append).await
}

/// Append `content` to a shared log file.
pub async fn append_log(path: &Path, content: &str) -> Result<()> {
    write_file(path, content, true).await
}

async fn write_file(path: &Path, content: &str, append: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating dir {:?}", parent))?;
        }
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }

    let mut file = options
        .open(path)
        .await
        .with_context(|| format!("opening output file {:?}", path))?;
    file.write_all(content.as_bytes())
        .await
        .with_context(|| format!("writing output file {:?}", path))?;
    file.flush().await?;
    Ok(())
}
