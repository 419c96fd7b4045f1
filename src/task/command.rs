// src/task/command.rs

//! What a task runs: a literal command with parameters, or a registered
//! in-process callable.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::exec::shell::Platform;

/// A parameter value. Non-string values are rendered as text before quoting:
/// `true` → `1`, `false` → `0`, numbers in decimal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    pub fn render(&self) -> String {
        match self {
            ParamValue::Bool(true) => "1".to_string(),
            ParamValue::Bool(false) => "0".to_string(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
            ParamValue::Str(s) => s.clone(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        ParamValue::Int(i64::from(i))
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Float(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Rendered as one quoted token.
    Positional(ParamValue),
    /// Rendered as a quoted key token followed by a quoted value token.
    Named(String, ParamValue),
}

/// Base command string plus ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub command: String,
    pub params: Vec<Param>,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<ParamValue>) -> Self {
        self.params.push(Param::Positional(value.into()));
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push(Param::Named(key.into(), value.into()));
        self
    }

    /// Command line for `platform`, without environment directives.
    pub fn render(&self, platform: Platform) -> String {
        let mut line = self.command.clone();
        for param in &self.params {
            match param {
                Param::Positional(value) => {
                    line.push(' ');
                    line.push_str(&platform.quote(&value.render()));
                }
                Param::Named(key, value) => {
                    line.push(' ');
                    line.push_str(&platform.quote(key));
                    line.push(' ');
                    line.push_str(&platform.quote(&value.render()));
                }
            }
        }
        line
    }
}

impl From<&str> for CommandSpec {
    fn from(s: &str) -> Self {
        CommandSpec::new(s)
    }
}

impl From<String> for CommandSpec {
    fn from(s: String) -> Self {
        CommandSpec::new(s)
    }
}

/// Reference to a callable the host registered under `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocable {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Invocable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for Invocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    Command(CommandSpec),
    Callable(Invocable),
}

impl TaskKind {
    /// Platform-independent text identifying what runs; input to the unique
    /// key. Callable name and arguments are length-prefixed so distinct
    /// argument lists never collide.
    pub fn fingerprint(&self) -> String {
        match self {
            TaskKind::Command(spec) => format!("command:{}", spec.render(Platform::Posix)),
            TaskKind::Callable(invocable) => {
                let mut out = format!("callable:{}:{}", invocable.name.len(), invocable.name);
                for arg in &invocable.args {
                    out.push_str(&format!(":{}:{arg}", arg.len()));
                }
                out
            }
        }
    }

    /// Human-readable form for listings.
    pub fn display(&self, platform: Platform) -> String {
        match self {
            TaskKind::Command(spec) => spec.render(platform),
            TaskKind::Callable(invocable) => format!("(callable) {invocable}"),
        }
    }
}
