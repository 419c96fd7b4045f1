// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`shell`] knows the platform's quoting and shell conventions.
//! - [`command_builder`] turns a task into a full command line.
//! - [`marshal`] encodes callable tasks for the `invoke` subcommand and holds
//!   the host's [`CallableRegistry`].
//! - [`process`] spawns a command line and captures its output.

pub mod command_builder;
pub mod marshal;
pub mod process;
pub mod shell;

pub use command_builder::CommandBuilder;
pub use marshal::{CallableRegistry, InvocableMarshaller, JsonMarshaller};
pub use process::ProcessHandle;
pub use shell::Platform;
