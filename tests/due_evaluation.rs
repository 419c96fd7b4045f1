// tests/due_evaluation.rs

mod common;
use crate::common::{init_tracing, local, utc};

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use cadence::clock::FixedClock;
use cadence::engine::{Selection, select_due};
use cadence::task::{Predicate, Task, TaskNumber, TaskSet};
use chrono::NaiveTime;
use chrono_tz::Tz;

type TestResult = Result<(), Box<dyn Error>>;

fn warsaw() -> Tz {
    chrono_tz::Europe::Warsaw
}

fn lisbon() -> Tz {
    chrono_tz::Europe::Lisbon
}

#[test]
fn test_task_timezone_overrides_comparison_timezone() -> TestResult {
    init_tracing();
    let task = Task::command("t", "true").daily_at("09:00")?.timezone(warsaw());

    assert!(task.is_due(local(warsaw(), 2024, 1, 15, 9, 0), Tz::UTC));
    assert!(!task.is_due(utc(2024, 1, 15, 9, 0), Tz::UTC));

    let without_tz = Task::command("t", "true").daily_at("09:00")?;
    assert!(without_tz.is_due(utc(2024, 1, 15, 9, 0), Tz::UTC));
    assert!(without_tz.is_due(local(lisbon(), 2024, 1, 15, 9, 0), lisbon()));
    assert!(!without_tz.is_due(utc(2024, 1, 15, 9, 0), warsaw()));
    Ok(())
}

#[test]
fn test_from_bound_in_task_timezone() -> TestResult {
    init_tracing();
    let task = Task::command("t", "true").from("12:00")?.timezone(warsaw());
    assert!(task.is_due(local(warsaw(), 2024, 1, 15, 12, 1), warsaw()));

    let task = Task::command("t", "true").from("11:01")?.timezone(lisbon());
    assert!(!task.is_due(local(warsaw(), 2024, 1, 15, 12, 0), warsaw()));
    Ok(())
}

#[test]
fn test_to_bound_in_task_timezone() -> TestResult {
    init_tracing();
    let task = Task::command("t", "true").to("14:00")?.timezone(warsaw());
    assert!(task.is_due(local(warsaw(), 2024, 1, 15, 13, 59), warsaw()));

    let task = Task::command("t", "true").to("18:00")?.timezone(warsaw());
    assert!(!task.is_due(local(lisbon(), 2024, 1, 15, 17, 1), lisbon()));
    Ok(())
}

#[test]
fn test_window_bounds_are_inclusive() -> TestResult {
    init_tracing();
    let task = Task::command("t", "true").between("08:00", "17:00")?;
    assert!(task.is_due(utc(2024, 1, 15, 8, 0), Tz::UTC));
    assert!(task.is_due(utc(2024, 1, 15, 17, 0), Tz::UTC));
    assert!(!task.is_due(utc(2024, 1, 15, 7, 59), Tz::UTC));
    assert!(!task.is_due(utc(2024, 1, 15, 17, 1), Tz::UTC));
    Ok(())
}

#[test]
fn test_window_with_full_dates() -> TestResult {
    init_tracing();
    let task = Task::command("t", "true")
        .from("2024-03-01")?
        .to("2024-03-31 23:59")?;
    assert!(!task.is_due(utc(2024, 2, 29, 23, 59), Tz::UTC));
    assert!(task.is_due(utc(2024, 3, 1, 0, 0), Tz::UTC));
    assert!(task.is_due(utc(2024, 3, 31, 23, 59), Tz::UTC));
    assert!(!task.is_due(utc(2024, 4, 1, 0, 0), Tz::UTC));
    Ok(())
}

#[test]
fn test_window_is_checked_at_minute_resolution() -> TestResult {
    init_tracing();
    let task = Task::command("t", "true").to("10:00")?;
    let late_in_minute = utc(2024, 1, 15, 10, 0) + chrono::Duration::seconds(45);
    assert!(task.is_due(late_in_minute, Tz::UTC));
    Ok(())
}

#[test]
fn test_invalid_bound_is_rejected() {
    init_tracing();
    assert!(Task::command("t", "true").from("tomorrow").is_err());
    assert!(Task::command("t", "true").to("25:99").is_err());
}

#[test]
fn test_when_and_skip_predicates() -> TestResult {
    init_tracing();
    let now = utc(2024, 1, 15, 12, 0);

    assert!(Task::command("t", "true").when(Predicate::Always).is_due(now, Tz::UTC));
    assert!(!Task::command("t", "true").when(Predicate::Never).is_due(now, Tz::UTC));
    assert!(!Task::command("t", "true").skip(Predicate::Always).is_due(now, Tz::UTC));
    assert!(Task::command("t", "true").skip(Predicate::Never).is_due(now, Tz::UTC));

    let business_hours = Predicate::TimeBetween {
        from: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        to: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    };
    let task = Task::command("t", "true").when(business_hours);
    assert!(task.is_due(now, Tz::UTC));
    assert!(!task.is_due(utc(2024, 1, 15, 20, 0), Tz::UTC));
    Ok(())
}

#[test]
fn test_time_between_wraps_past_midnight() {
    init_tracing();
    let night = Predicate::TimeBetween {
        from: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        to: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
    };
    let task = Task::command("t", "true").skip(night);
    assert!(!task.is_due(utc(2024, 1, 15, 23, 30), Tz::UTC));
    assert!(!task.is_due(utc(2024, 1, 15, 5, 0), Tz::UTC));
    assert!(task.is_due(utc(2024, 1, 15, 12, 0), Tz::UTC));
}

#[test]
fn test_all_predicates_run_once_schedule_matches() -> TestResult {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let counting = |result: bool| {
        let calls = Arc::clone(&calls);
        Predicate::custom(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            result
        })
    };

    let task = Task::command("t", "true")
        .when(counting(false))
        .when(counting(true))
        .skip(counting(false));
    assert!(!task.is_due(utc(2024, 1, 15, 12, 0), Tz::UTC));
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    // A cron miss short-circuits before any predicate.
    let task = Task::command("t", "true").hourly()?.when(counting(true));
    calls.store(0, Ordering::SeqCst);
    assert!(!task.is_due(utc(2024, 1, 15, 12, 30), Tz::UTC));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_predicates_run_in_registration_order_across_kinds() {
    init_tracing();
    let order = Arc::new(Mutex::new(Vec::new()));
    let recording = |name: &'static str, result: bool| {
        let order = Arc::clone(&order);
        Predicate::custom(move || {
            order.lock().unwrap().push(name);
            result
        })
    };

    let task = Task::command("t", "true")
        .skip(recording("skip-1", false))
        .when(recording("when-1", true))
        .skip(recording("skip-2", false))
        .when(recording("when-2", true));

    assert!(task.is_due(utc(2024, 1, 15, 12, 0), Tz::UTC));
    assert_eq!(
        *order.lock().unwrap(),
        vec!["skip-1", "when-1", "skip-2", "when-2"]
    );
}

fn sample_set() -> Result<TaskSet, Box<dyn Error>> {
    Ok(vec![
        Task::command("every-minute", "true"),
        Task::command("hourly", "true").hourly()?,
        Task::command("midnight", "true").daily()?,
    ]
    .into_iter()
    .collect())
}

#[test]
fn test_select_due_keeps_set_order() -> TestResult {
    init_tracing();
    let set = sample_set()?;
    let clock = FixedClock::new(utc(2024, 1, 15, 0, 0));

    let due = select_due(&set, Selection::default(), &clock, Tz::UTC)?;
    let ids: Vec<&str> = due.iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec!["every-minute", "hourly", "midnight"]);

    clock.set(utc(2024, 1, 15, 13, 0));
    let due = select_due(&set, Selection::default(), &clock, Tz::UTC)?;
    let ids: Vec<&str> = due.iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec!["every-minute", "hourly"]);
    Ok(())
}

#[test]
fn test_select_due_with_force_and_task_number() -> TestResult {
    init_tracing();
    let set = sample_set()?;
    let clock = FixedClock::new(utc(2024, 1, 15, 13, 7));

    let forced = Selection {
        force: true,
        task: None,
    };
    assert_eq!(select_due(&set, forced, &clock, Tz::UTC)?.len(), 3);

    let only_third = Selection {
        force: false,
        task: Some(TaskNumber::new(3)?),
    };
    assert!(select_due(&set, only_third, &clock, Tz::UTC)?.is_empty());

    let forced_third = Selection {
        force: true,
        task: Some(TaskNumber::new(3)?),
    };
    let due = select_due(&set, forced_third, &clock, Tz::UTC)?;
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id(), "midnight");
    Ok(())
}

#[test]
fn test_select_due_with_out_of_range_number_fails() -> TestResult {
    init_tracing();
    let set = sample_set()?;
    let clock = FixedClock::new(utc(2024, 1, 15, 13, 7));
    let selection = Selection {
        force: true,
        task: Some(TaskNumber::new(4)?),
    };
    let err = select_due(&set, selection, &clock, Tz::UTC).unwrap_err();
    assert_eq!(err.to_string(), "Task with number '4' not found. Total tasks: 3.");
    Ok(())
}
