// src/cron/mod.rs

//! Cron expressions.
//!
//! - [`field`] parses one comma-separated field into a set of values.
//! - [`rule`] holds a validated five-field rule and answers "is this minute
//!   due?" and "which minutes come next?".

pub mod field;
pub mod rule;

pub use field::{CronField, FieldKind};
pub use rule::{CronRule, EVERY_MINUTE};
