// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CadenceError {
    /// Malformed cron expression or frequency shortcut argument.
    #[error("{0}")]
    Expression(String),

    /// Execution environment cannot be expressed on this platform
    /// (e.g. switching user on Windows).
    #[error("{0}")]
    Environment(String),

    /// An invocable task could not be turned into a command line.
    #[error("Cannot marshal callable '{name}': {reason}")]
    Marshal { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task source error in {path}: {reason}")]
    TaskSource { path: String, reason: String },

    #[error("{0}")]
    TaskNumber(String),

    #[error("Lock store error for key '{key}': {reason}")]
    Lock { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CadenceError>;
