// src/config/mod.rs

//! Configuration loading and validation for cadence.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Turn raw strings into typed values: durations, timezone (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, LockSection, RawConfigFile};
pub use validate::parse_timezone;
