// src/source/mod.rs

//! Task-definition files.
//!
//! - [`finder`] locates `*Tasks.toml` files under the source directory.
//! - [`model`] is the TOML shape of a task file.
//! - [`loader`] validates definitions and builds the [`TaskSet`](crate::task::TaskSet).

pub mod finder;
pub mod loader;
pub mod model;

pub use finder::TaskFileFinder;
pub use loader::TaskSource;
pub use model::{ParamDef, PredicateDef, TaskDef, TaskFile};
