// src/lib.rs

pub mod cli;
pub mod clock;
pub mod config;
pub mod cron;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod listing;
pub mod lock;
pub mod logging;
pub mod source;
pub mod task;
pub mod types;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::clock::{Clock, SystemClock};
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::engine::{HttpPinger, Mailer, OutputSinks, Runner, Selection, select_due};
use crate::exec::{CallableRegistry, CommandBuilder, InvocableMarshaller, JsonMarshaller, Platform};
use crate::fs::RealFileSystem;
use crate::lock::{LockStore, store_for};
use crate::source::TaskSource;
use crate::task::{TaskNumber, TaskSet};
use crate::types::ListFormat;

/// What the embedding binary contributes: its callables and, optionally,
/// mail delivery.
#[derive(Debug, Clone, Default)]
pub struct Host {
    pub callables: CallableRegistry,
    pub mailer: Option<Arc<dyn Mailer>>,
}

/// High-level entry point used by `main.rs`. Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    run_with(args, Host::default()).await
}

/// Entry point for binaries that register their own callables.
///
/// This wires together:
/// - config loading
/// - lock store selection
/// - task source loading
/// - selection + runner (for `run`)
pub async fn run_with(args: CliArgs, host: Host) -> Result<i32> {
    let config_path = PathBuf::from(&args.config);

    match args.command {
        Command::Invoke { token } => invoke(&token, &host.callables),
        Command::List { source, format } => {
            let cfg = load_and_validate(&config_path)?;
            let format: ListFormat = format.parse()?;
            let set = load_task_set(&cfg, source.as_deref(), Arc::new(SystemClock))?;
            let rendered = listing::render_list(&set, format, Platform::current())?;
            print_stdout(&rendered)?;
            Ok(0)
        }
        Command::Info { task, source } => {
            let cfg = load_and_validate(&config_path)?;
            let number: TaskNumber = task.parse()?;
            let comparison = cfg.timezone()?;
            let clock = Arc::new(SystemClock);
            let set = load_task_set(&cfg, source.as_deref(), clock.clone())?;
            let task = set.get(number)?;
            let rendered =
                listing::render_info(number, task, comparison, clock.now(), Platform::current());
            print_stdout(&rendered)?;
            Ok(0)
        }
        Command::Run {
            source,
            force,
            task,
        } => {
            let cfg = load_and_validate(&config_path)?;
            let selection = Selection {
                force,
                task: task.as_deref().map(str::parse::<TaskNumber>).transpose()?,
            };
            run_due_tasks(&cfg, source.as_deref(), selection, host).await?;
            Ok(0)
        }
    }
}

/// Load, select and run. Per-task failures are reported in the log; only
/// configuration and selection problems are errors.
async fn run_due_tasks(
    cfg: &ConfigFile,
    source: Option<&Path>,
    selection: Selection,
    host: Host,
) -> Result<()> {
    let comparison = cfg.timezone()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Selection takes overlap locks, so everything that can fail comes first.
    let runner = build_runner(cfg, clock.clone(), host)?;
    let set = load_task_set(cfg, source, clock.clone())?;
    let due = select_due(&set, selection, clock.as_ref(), comparison)?;
    if due.is_empty() {
        info!("no task is due");
        return Ok(());
    }

    let batch = runner.run(&due).await;
    info!(
        tasks = batch.len(),
        succeeded = batch.succeeded(),
        failed = batch.failed(),
        not_started = batch.not_started(),
        "run complete"
    );
    Ok(())
}

fn build_runner(cfg: &ConfigFile, clock: Arc<dyn Clock>, host: Host) -> Result<Runner> {
    let host_binary = cfg.host_binary()?;
    if host_binary.is_absolute() && !host_binary.is_file() {
        anyhow::bail!("host binary '{}' does not exist", host_binary.display());
    }

    let marshaller: Arc<dyn InvocableMarshaller> =
        Arc::new(JsonMarshaller::with_registry(Arc::new(host.callables)));
    let builder = CommandBuilder::new(Platform::current(), host_binary).with_marshaller(marshaller);
    let pinger = Arc::new(HttpPinger::new()?);

    let mut runner = Runner::new(builder, clock, pinger)
        .with_sinks(OutputSinks::from_config(cfg))
        .with_poll_interval(cfg.config.poll_interval);
    if let Some(mailer) = host.mailer {
        runner = runner.with_mailer(mailer);
    }
    Ok(runner)
}

fn load_task_set(cfg: &ConfigFile, source: Option<&Path>, clock: Arc<dyn Clock>) -> Result<TaskSet> {
    let root = source
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cfg.config.source.clone());
    let locks: Arc<dyn LockStore> = store_for(cfg.lock.store, cfg.lock.dir.clone(), clock);

    debug!(root = %root.display(), suffix = %cfg.config.suffix, store = ?cfg.lock.store, "loading tasks");
    let source = TaskSource::new(
        Arc::new(RealFileSystem),
        root,
        &cfg.config.suffix,
        locks,
        cfg.lock.ttl,
    )?;
    Ok(source.load()?)
}

/// `cadence invoke <token>`: decode and run a callable in this process.
fn invoke(token: &str, callables: &CallableRegistry) -> Result<i32> {
    let invocable = JsonMarshaller::new()
        .unmarshal(token)
        .context("decoding invoke token")?;
    debug!(callable = %invocable, "invoking callable");
    let code = callables
        .invoke(&invocable)
        .with_context(|| format!("running callable '{}'", invocable.name))?;
    Ok(code)
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
