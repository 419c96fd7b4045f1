// tests/task_source.rs

mod common;
use crate::common::builders::{TaskTableBuilder, task_file};
use crate::common::{init_tracing, utc, write_task_file};

use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cadence::clock::FixedClock;
use cadence::errors::CadenceError;
use cadence::exec::Platform;
use cadence::fs::RealFileSystem;
use cadence::fs::mock::MockFileSystem;
use cadence::lock::{LockStore, MemoryLockStore};
use cadence::source::{TaskFileFinder, TaskSource};
use cadence::task::{TaskKind, TaskSet};
use chrono_tz::Tz;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

const ROOT: &str = "/srv/tasks";

fn memory_locks() -> Arc<dyn LockStore> {
    Arc::new(MemoryLockStore::new(Arc::new(FixedClock::new(utc(2024, 1, 15, 12, 0)))))
}

fn source_for(fs: &MockFileSystem) -> Result<TaskSource, CadenceError> {
    TaskSource::new(
        Arc::new(fs.clone()),
        ROOT,
        "Tasks.toml",
        memory_locks(),
        Duration::from_secs(24 * 60 * 60),
    )
}

fn load_single(contents: &str) -> Result<TaskSet, CadenceError> {
    let fs = MockFileSystem::new();
    fs.add_file(Path::new(ROOT).join("SingleTasks.toml"), contents);
    source_for(&fs)?.load()
}

#[test]
fn test_finder_matches_suffix_case_insensitively() -> TestResult {
    init_tracing();
    let finder = TaskFileFinder::new("Tasks.toml")?;
    assert!(finder.is_task_file(Path::new("/a/BackupTasks.toml")));
    assert!(finder.is_task_file(Path::new("/a/backuptasks.TOML")));
    assert!(finder.is_task_file(Path::new("/a/Tasks.toml")));
    assert!(!finder.is_task_file(Path::new("/a/Tasks.toml.bak")));
    assert!(!finder.is_task_file(Path::new("/a/Tasks/other.toml")));
    Ok(())
}

#[test]
fn test_files_are_found_recursively_in_sorted_order() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file(
        "/srv/tasks/nested/MailTasks.toml",
        task_file(&[TaskTableBuilder::command("mail-digest")]),
    );
    fs.add_file(
        "/srv/tasks/BackupTasks.toml",
        task_file(&[
            TaskTableBuilder::command("backup-db"),
            TaskTableBuilder::command("backup-files"),
        ]),
    );
    fs.add_file("/srv/tasks/README.md", "# not a task file");

    let set = source_for(&fs)?.load()?;
    let ids: Vec<&str> = set.iter().map(|t| t.id()).collect();
    assert_eq!(
        ids,
        vec![
            "BackupTasks.toml#1",
            "BackupTasks.toml#2",
            "nested/MailTasks.toml#1"
        ]
    );
    Ok(())
}

#[test]
fn test_missing_source_directory_yields_empty_set() -> TestResult {
    init_tracing();
    let set = source_for(&MockFileSystem::new())?.load()?;
    assert!(set.is_empty());
    Ok(())
}

#[test]
fn test_command_parameters_are_expanded_in_order() -> TestResult {
    init_tracing();
    let table = TaskTableBuilder::command("/usr/bin/backup")
        .raw("parameters", r#"["-v", { "--level" = 3 }, { "--z" = true, "--a" = "x", "--m" = 2 }]"#);
    let set = load_single(&task_file(&[table]))?;

    let task = set.iter().next().ok_or("no task loaded")?;
    assert_eq!(
        task.kind().display(Platform::Posix),
        "/usr/bin/backup '-v' '--level' '3' '--z' '1' '--a' 'x' '--m' '2'"
    );
    Ok(())
}

#[test]
fn test_schedule_keys_compose() -> TestResult {
    init_tracing();
    let set = load_single(&task_file(&[
        TaskTableBuilder::command("a").set("every", "weekdays").set("at", "08:30"),
        TaskTableBuilder::command("b").set("cron", "*/5 * * * *").set("days", "6,0"),
        TaskTableBuilder::command("c").set("every", "every_fifteen_minutes"),
        TaskTableBuilder::command("d"),
    ]))?;

    let expressions: Vec<String> = set.iter().map(|t| t.expression()).collect();
    assert_eq!(
        expressions,
        vec!["30 8 * * 1-5", "*/5 * * * 6,0", "*/15 * * * *", "* * * * *"]
    );
    Ok(())
}

#[test]
fn test_full_task_table_is_applied() -> TestResult {
    init_tracing();
    let table = TaskTableBuilder::command("php artisan report")
        .set("description", "Nightly report")
        .set("cron", "0 2 * * *")
        .set("timezone", "Europe/Warsaw")
        .set("from", "2024-01-01")
        .set("working_dir", "/srv/app")
        .set("user", "www-data")
        .raw("prevent_overlapping", "true")
        .set("lock_ttl", "2h")
        .set("ping_before", "https://hc.example/start")
        .set("ping_after", "https://hc.example/done")
        .set("output", "/var/log/report.log")
        .raw("append_output", "true")
        .raw("mail_errors", "true");
    let set = load_single(&task_file(&[table]))?;
    let task = set.iter().next().ok_or("no task loaded")?;

    assert_eq!(task.get_description(), Some("Nightly report"));
    assert_eq!(task.timezone_override(), Some(chrono_tz::Europe::Warsaw));
    assert_eq!(task.working_dir(), Some(Path::new("/srv/app")));
    assert_eq!(task.run_as_user(), Some("www-data"));
    assert_eq!(task.overlap().map(|g| g.ttl()), Some(Duration::from_secs(2 * 60 * 60)));
    assert_eq!(task.hooks().ping_before.as_deref(), Some("https://hc.example/start"));
    assert_eq!(task.hooks().ping_after.as_deref(), Some("https://hc.example/done"));
    assert!(task.hooks().mail_errors);
    assert!(!task.hooks().mail_output);
    let target = task.output_target().ok_or("no output target")?;
    assert_eq!(target.path, Path::new("/var/log/report.log"));
    assert!(target.append);
    assert!(task.captures_output());
    Ok(())
}

#[test]
fn test_overlap_uses_source_default_ttl() -> TestResult {
    init_tracing();
    let set = load_single(&task_file(&[
        TaskTableBuilder::command("a").raw("prevent_overlapping", "true"),
        TaskTableBuilder::command("b").set("lock_ttl", "5m"),
    ]))?;
    let tasks: Vec<_> = set.iter().collect();

    assert_eq!(
        tasks[0].overlap().map(|g| g.ttl()),
        Some(Duration::from_secs(24 * 60 * 60))
    );
    // lock_ttl alone does not enable overlap prevention.
    assert!(!tasks[1].prevents_overlapping());
    Ok(())
}

#[test]
fn test_callable_tasks_carry_arguments() -> TestResult {
    init_tracing();
    let table = TaskTableBuilder::callable("cleanup").raw("args", r#"["--days", "30"]"#);
    let set = load_single(&task_file(&[table]))?;
    let task = set.iter().next().ok_or("no task loaded")?;

    match task.kind() {
        TaskKind::Callable(invocable) => {
            assert_eq!(invocable.name, "cleanup");
            assert_eq!(invocable.args, vec!["--days", "30"]);
        }
        other => panic!("expected callable, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_predicates_from_file() -> TestResult {
    init_tracing();
    let set = load_single(&task_file(&[
        TaskTableBuilder::command("a").raw("when", r#"{ between = ["08:00", "18:00"] }"#),
        TaskTableBuilder::command("b").raw("skip", r#"["never", "always"]"#),
        TaskTableBuilder::command("c").set("when", "always"),
    ]))?;
    let tasks: Vec<_> = set.iter().collect();

    assert!(tasks[0].is_due(utc(2024, 1, 15, 12, 0), Tz::UTC));
    assert!(!tasks[0].is_due(utc(2024, 1, 15, 19, 0), Tz::UTC));
    assert!(!tasks[1].is_due(utc(2024, 1, 15, 12, 0), Tz::UTC));
    assert!(tasks[2].is_due(utc(2024, 1, 15, 12, 0), Tz::UTC));
    Ok(())
}

#[test]
fn test_invalid_definitions_name_the_file_and_task() {
    init_tracing();
    let cases = [
        (
            task_file(&[
                TaskTableBuilder::command("ok"),
                TaskTableBuilder::command("a").set("cron", "* * *"),
            ]),
            "task #2: Expression '* * *' has fewer than five parts.",
        ),
        (
            task_file(&[TaskTableBuilder::command("a").set("timezone", "Mars/Olympus")]),
            "invalid timezone 'Mars/Olympus'",
        ),
        (
            task_file(&[TaskTableBuilder::command("a")
                .set("cron", "* * * * *")
                .set("every", "daily")]),
            "`cron` and `every` are mutually exclusive",
        ),
        (
            task_file(&[TaskTableBuilder::command("a").set("callable", "b")]),
            "`command` and `callable` are mutually exclusive",
        ),
        (
            task_file(&[TaskTableBuilder::command("a").set("from", "soon")]),
            "Invalid date/time bound 'soon'",
        ),
        (
            task_file(&[TaskTableBuilder::command("a").set("every", "fortnightly")]),
            "Unknown frequency 'fortnightly'.",
        ),
        (
            task_file(&[TaskTableBuilder::command("a").set("colour", "blue")]),
            "unknown field",
        ),
        ("[[task]]\ndescription = 'no command'\n".to_string(), "is required"),
    ];

    for (contents, expected) in cases {
        match load_single(&contents) {
            Err(CadenceError::TaskSource { path, reason }) => {
                assert!(path.ends_with("SingleTasks.toml"), "path was {path}");
                assert!(reason.contains(expected), "reason '{reason}' lacks '{expected}'");
            }
            other => panic!("expected task source error for {contents:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_loads_from_real_directory() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    write_task_file(
        dir.path(),
        "app/CleanupTasks.toml",
        &task_file(&[TaskTableBuilder::command("rm -rf /tmp/cache").set("every", "hourly")]),
    );
    write_task_file(dir.path(), "app/notes.toml", "not = 'a task file'");

    let source = TaskSource::new(
        Arc::new(RealFileSystem),
        dir.path(),
        "Tasks.toml",
        memory_locks(),
        Duration::from_secs(60),
    )?;
    let set = source.load()?;

    assert_eq!(set.len(), 1);
    let task = set.iter().next().ok_or("no task loaded")?;
    assert_eq!(task.id(), format!("app{}CleanupTasks.toml#1", std::path::MAIN_SEPARATOR));
    assert_eq!(task.expression(), "0 * * * *");
    Ok(())
}
