// tests/cli_and_logging.rs

use std::error::Error;
use std::path::PathBuf;

use cadence::cli::{CliArgs, Command, LogLevel};
use cadence::logging::resolve_filter;
use clap::Parser;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn test_cli_level_wins_over_environment() {
    let filter = resolve_filter(Some(LogLevel::Debug), Some("trace"));
    assert_eq!(filter.to_string(), "debug");
}

#[test]
fn test_environment_value_may_be_a_directive() {
    let filter = resolve_filter(None, Some("cadence::engine=trace,warn"));
    let rendered = filter.to_string();
    assert!(rendered.contains("cadence::engine=trace"), "{rendered}");
    assert!(rendered.contains("warn"), "{rendered}");
}

#[test]
fn test_default_and_unparsable_values_fall_back_to_info() {
    assert_eq!(resolve_filter(None, None).to_string(), "info");
    assert_eq!(resolve_filter(None, Some("   ")).to_string(), "info");
    assert_eq!(resolve_filter(None, Some("cadence=loud")).to_string(), "info");
}

#[test]
fn test_run_arguments() -> TestResult {
    let args = CliArgs::try_parse_from([
        "cadence",
        "--config",
        "/etc/cadence.toml",
        "run",
        "/srv/tasks",
        "--force",
        "-t",
        "2",
    ])?;
    assert_eq!(args.config, "/etc/cadence.toml");
    match args.command {
        Command::Run {
            source,
            force,
            task,
        } => {
            assert_eq!(source, Some(PathBuf::from("/srv/tasks")));
            assert!(force);
            assert_eq!(task.as_deref(), Some("2"));
        }
        other => panic!("expected run, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_list_and_info_arguments() -> TestResult {
    let args = CliArgs::try_parse_from(["cadence", "list", "--format", "json"])?;
    assert_eq!(args.config, "cadence.toml");
    assert!(args.log_level.is_none());
    match args.command {
        Command::List { source, format } => {
            assert_eq!(source, None);
            assert_eq!(format, "json");
        }
        other => panic!("expected list, got {other:?}"),
    }

    let args = CliArgs::try_parse_from(["cadence", "info", "3", "--log-level", "trace"])?;
    assert!(matches!(args.log_level, Some(LogLevel::Trace)));
    match args.command {
        Command::Info { task, source } => {
            assert_eq!(task, "3");
            assert_eq!(source, None);
        }
        other => panic!("expected info, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_unknown_log_level_is_rejected() {
    assert!(CliArgs::try_parse_from(["cadence", "--log-level", "loud", "list"]).is_err());
}
