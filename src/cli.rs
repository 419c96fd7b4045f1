// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `cadence`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cadence",
    version,
    about = "Run recurring tasks defined in task files on cron schedules.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `cadence.toml` in the current working directory. A missing
    /// file means "all defaults".
    #[arg(long, global = true, value_name = "PATH", default_value = "cadence.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CADENCE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the tasks that are due now. Meant to be called every minute.
    Run {
        /// Task source directory; overrides `[config].source`.
        #[arg(value_name = "SOURCE")]
        source: Option<PathBuf>,

        /// Run all tasks (or the one given by `--task`) regardless of schedule.
        #[arg(long, short = 'f')]
        force: bool,

        /// Consider only the task with this number (see `cadence list`).
        #[arg(long, short = 't', value_name = "N")]
        task: Option<String>,
    },

    /// List all tasks with their numbers.
    List {
        #[arg(value_name = "SOURCE")]
        source: Option<PathBuf>,

        /// `text` or `json`.
        #[arg(long, value_name = "FORMAT", default_value = "text")]
        format: String,
    },

    /// Show details and the next run dates of one task.
    Info {
        /// Task number (see `cadence list`).
        #[arg(value_name = "N")]
        task: String,

        #[arg(value_name = "SOURCE")]
        source: Option<PathBuf>,
    },

    /// Run a marshalled callable. Used internally by callable tasks.
    #[command(hide = true)]
    Invoke {
        #[arg(value_name = "TOKEN")]
        token: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
