// tests/command_building.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::sync::Arc;

use cadence::errors::CadenceError;
use cadence::exec::{
    CallableRegistry, CommandBuilder, InvocableMarshaller, JsonMarshaller, Platform,
};
use cadence::task::{CommandSpec, Invocable, Task};

type TestResult = Result<(), Box<dyn Error>>;

fn posix() -> CommandBuilder {
    CommandBuilder::new(Platform::Posix, "/usr/local/bin/app")
}

fn windows() -> CommandBuilder {
    CommandBuilder::new(Platform::Windows, r"C:\bin\app.exe")
}

#[test]
fn test_posix_parameters_are_single_quoted() -> TestResult {
    init_tracing();
    let spec = CommandSpec::new("/usr/bin/php").option("--ini", "php.ini").arg("-v");
    let task = Task::command("t", spec);
    assert_eq!(posix().build(&task)?, "/usr/bin/php '--ini' 'php.ini' '-v'");
    Ok(())
}

#[test]
fn test_windows_parameters_are_bare_when_safe() -> TestResult {
    init_tracing();
    let spec = CommandSpec::new("php").option("--ini", "php.ini").arg("-v");
    let task = Task::command("t", spec);
    assert_eq!(windows().build(&task)?, "php --ini php.ini -v");
    Ok(())
}

#[test]
fn test_parameter_values_are_rendered_then_quoted() -> TestResult {
    init_tracing();
    let spec = CommandSpec::new("tool")
        .option("--dry-run", true)
        .option("--verbose", false)
        .option("--level", 3)
        .arg("it's here");
    let task = Task::command("t", spec);
    assert_eq!(
        posix().build(&task)?,
        r"tool '--dry-run' '1' '--verbose' '0' '--level' '3' 'it'\''s here'"
    );

    let spec = CommandSpec::new("echo").arg("say \"hi\"").arg("a&b");
    let task = Task::command("t", spec);
    assert_eq!(windows().build(&task)?, r#"echo "say ""hi""" "a&b""#);
    Ok(())
}

#[test]
fn test_working_dir_and_user_prefix_every_directive() -> TestResult {
    init_tracing();
    let task = Task::command("t", "php -i").in_dir("/var/test").user("john");
    assert_eq!(posix().build(&task)?, "sudo -u john cd /var/test; sudo -u john php -i");

    let task = Task::command("t", "php -i").user("john");
    assert_eq!(posix().build(&task)?, "sudo -u john php -i");

    let task = Task::command("t", "ls").in_dir("/srv/my app");
    assert_eq!(posix().build(&task)?, "cd '/srv/my app'; ls");
    Ok(())
}

#[test]
fn test_windows_working_dir_uses_cd_d() -> TestResult {
    init_tracing();
    let task = Task::command("t", "php -v").in_dir(r"C:\windows\temp");
    assert_eq!(windows().build(&task)?, r"cd /d C:\windows\temp & php -v");
    Ok(())
}

#[test]
fn test_windows_user_switch_is_an_environment_error() {
    init_tracing();
    let task = Task::command("t", "php -v").user("john");
    match windows().build(&task) {
        Err(CadenceError::Environment(msg)) => {
            assert_eq!(msg, "Changing user on Windows is not implemented.")
        }
        other => panic!("expected environment error, got {other:?}"),
    }
}

#[test]
fn test_list_display_omits_directives() {
    init_tracing();
    let task = Task::command("t", CommandSpec::new("php").arg("-v"))
        .in_dir("/var/test")
        .user("john");
    assert_eq!(posix().display_command(&task), "php '-v'");
}

#[test]
fn test_callable_runs_through_host_binary() -> TestResult {
    init_tracing();
    let mut registry = CallableRegistry::new();
    registry.register("report", |_args| Ok(0));
    let marshaller = Arc::new(JsonMarshaller::with_registry(Arc::new(registry)));
    let builder = posix().with_marshaller(marshaller.clone());

    let invocable = Invocable::new("report").with_args(["daily", "--full"]);
    let task = Task::callable("t", invocable.clone());
    let line = builder.build(&task)?;

    let token = line
        .strip_prefix("/usr/local/bin/app invoke '")
        .and_then(|rest| rest.strip_suffix('\''))
        .ok_or("unexpected command line shape")?;
    assert_eq!(marshaller.unmarshal(token)?, invocable);
    Ok(())
}

#[test]
fn test_unregistered_callable_is_a_marshal_error() {
    init_tracing();
    let marshaller = Arc::new(JsonMarshaller::with_registry(Arc::new(CallableRegistry::new())));
    let builder = posix().with_marshaller(marshaller);
    let task = Task::callable("t", Invocable::new("missing"));

    match builder.build(&task) {
        Err(CadenceError::Marshal { name, .. }) => assert_eq!(name, "missing"),
        other => panic!("expected marshal error, got {other:?}"),
    }
}

#[test]
fn test_garbage_token_is_rejected() {
    init_tracing();
    let marshaller = JsonMarshaller::new();
    assert!(marshaller.unmarshal("not base64 !!").is_err());
    assert!(marshaller.unmarshal("bm90IGpzb24").is_err());
}

#[test]
fn test_registry_invokes_with_arguments() -> TestResult {
    init_tracing();
    let mut registry = CallableRegistry::new();
    registry
        .register("count", |args| Ok(args.len() as i32))
        .register("boom", |_| Err(anyhow::anyhow!("boom")));

    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["boom", "count"]);
    assert_eq!(registry.invoke(&Invocable::new("count").with_args(["a", "b"]))?, 2);
    assert!(registry.invoke(&Invocable::new("boom")).is_err());
    assert!(registry.invoke(&Invocable::new("nope")).is_err());
    Ok(())
}
