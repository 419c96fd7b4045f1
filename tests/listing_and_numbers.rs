// tests/listing_and_numbers.rs

mod common;
use crate::common::{init_tracing, utc};

use std::error::Error;

use cadence::errors::CadenceError;
use cadence::exec::Platform;
use cadence::listing::{render_info, render_list};
use cadence::task::{CommandSpec, Invocable, Task, TaskNumber, TaskSet};
use cadence::types::ListFormat;
use chrono_tz::Tz;

type TestResult = Result<(), Box<dyn Error>>;

fn backup_set() -> Result<TaskSet, Box<dyn Error>> {
    let task = Task::command("BackupTasks.toml#1", CommandSpec::new("php").arg("-v"))
        .description("Backup")
        .cron("0 2 * * *")?;
    Ok(std::iter::once(task).collect())
}

#[test]
fn test_text_list_is_an_aligned_table() -> TestResult {
    init_tracing();
    let rendered = render_list(&backup_set()?, ListFormat::Text, Platform::Posix)?;
    let expected = "\
+---+--------+------------+----------------+
| # | Task   | Expression | Command to Run |
+---+--------+------------+----------------+
| 1 | Backup | 0 2 * * *  | php '-v'       |
+---+--------+------------+----------------+
";
    assert_eq!(rendered, expected);
    Ok(())
}

#[test]
fn test_json_list_has_one_object_per_task() -> TestResult {
    init_tracing();
    let mut set = backup_set()?;
    set.push(Task::callable("x#1", Invocable::new("cleanup").with_args(["7"])));

    let rendered = render_list(&set, ListFormat::Json, Platform::Posix)?;
    let value: serde_json::Value = serde_json::from_str(&rendered)?;

    assert_eq!(
        value,
        serde_json::json!([
            {
                "number": 1,
                "task": "Backup",
                "expression": "0 2 * * *",
                "command": "php '-v'"
            },
            {
                "number": 2,
                "task": "",
                "expression": "* * * * *",
                "command": "(callable) cleanup(7)"
            }
        ])
    );
    Ok(())
}

#[test]
fn test_empty_list_says_so_in_every_format() -> TestResult {
    init_tracing();
    let empty = TaskSet::new();
    assert_eq!(render_list(&empty, ListFormat::Text, Platform::Posix)?, "No task found!\n");
    assert_eq!(render_list(&empty, ListFormat::Json, Platform::Posix)?, "No task found!\n");
    Ok(())
}

#[test]
fn test_info_shows_details_and_upcoming_dates() -> TestResult {
    init_tracing();
    let task = Task::command("BackupTasks.toml#1", "php -v")
        .description("Backup")
        .cron("0 2 * * *")?
        .timezone(chrono_tz::Europe::Warsaw);

    let number = TaskNumber::new(1)?;
    let rendered = render_info(number, &task, Tz::UTC, utc(2024, 1, 15, 12, 0), Platform::Posix);

    assert!(rendered.starts_with("Task #1 (BackupTasks.toml#1)\n"));
    assert!(rendered.contains("Command to run:        php -v\n"));
    assert!(rendered.contains("Description:           Backup\n"));
    assert!(rendered.contains("Prevent overlapping:   No\n"));
    assert!(rendered.contains("Cron expression:       0 2 * * *\n"));
    assert!(rendered.contains("Task timezone:         Europe/Warsaw\n"));
    assert!(rendered.contains("Comparisons timezone:  UTC\n"));
    assert!(rendered.contains("Example run dates (timezone Europe/Warsaw):\n"));
    assert!(rendered.contains("  #1: 2024-01-16 02:00:00 CET\n"));
    assert!(rendered.contains("  #5: 2024-01-20 02:00:00 CET\n"));
    assert!(!rendered.contains("#6:"));
    Ok(())
}

#[test]
fn test_info_falls_back_to_comparison_timezone() -> TestResult {
    init_tracing();
    let task = Task::command("t", "true").cron("0 0 31 2 *")?;
    let rendered = render_info(
        TaskNumber::new(3)?,
        &task,
        chrono_tz::Europe::Lisbon,
        utc(2024, 1, 15, 12, 0),
        Platform::Posix,
    );

    assert!(rendered.contains("Task timezone:         (none)\n"));
    assert!(rendered.contains("Example run dates (timezone Europe/Lisbon):\n"));
    assert!(rendered.contains("(no run date within the next five years)"));
    Ok(())
}

#[test]
fn test_task_number_parsing() -> TestResult {
    init_tracing();
    assert_eq!("2".parse::<TaskNumber>()?.get(), 2);
    assert_eq!(" 7 ".parse::<TaskNumber>()?.as_index(), 6);

    match "abc".parse::<TaskNumber>() {
        Err(CadenceError::TaskNumber(msg)) => assert_eq!(msg, "Task number 'abc' is not numeric."),
        other => panic!("expected task number error, got {other:?}"),
    }
    for below in ["0", "-3"] {
        match below.parse::<TaskNumber>() {
            Err(CadenceError::TaskNumber(msg)) => {
                assert_eq!(msg, "Passed task number must be greater or equal to 1.")
            }
            other => panic!("expected task number error, got {other:?}"),
        }
    }
    Ok(())
}

#[test]
fn test_task_lookup_by_number_and_id() -> TestResult {
    init_tracing();
    let set = backup_set()?;
    assert_eq!(set.get(TaskNumber::new(1)?)?.id(), "BackupTasks.toml#1");
    assert!(set.find("BackupTasks.toml#1").is_some());
    assert!(set.find("missing").is_none());

    let err = set.get(TaskNumber::new(2)?).unwrap_err();
    assert_eq!(err.to_string(), "Task with number '2' not found. Total tasks: 1.");
    Ok(())
}
