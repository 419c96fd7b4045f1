// src/task/predicate.rs

use std::fmt;
use std::sync::Arc;

use chrono::NaiveTime;

/// A `when` / `skip` condition.
///
/// Built-in variants cover the data-driven cases; [`Predicate::Custom`]
/// accepts any host function.
#[derive(Clone)]
pub enum Predicate {
    Always,
    Never,
    /// True while the local time of day is within `[from, to]`. A window
    /// with `from > to` wraps past midnight.
    TimeBetween { from: NaiveTime, to: NaiveTime },
    Custom(Arc<dyn Fn() -> bool + Send + Sync>),
}

impl Predicate {
    pub fn custom(f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Predicate::Custom(Arc::new(f))
    }

    pub fn evaluate(&self, local_time: NaiveTime) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Never => false,
            Predicate::TimeBetween { from, to } if from <= to => {
                local_time >= *from && local_time <= *to
            }
            Predicate::TimeBetween { from, to } => local_time >= *from || local_time <= *to,
            Predicate::Custom(f) => f(),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always => f.write_str("Always"),
            Predicate::Never => f.write_str("Never"),
            Predicate::TimeBetween { from, to } => f
                .debug_struct("TimeBetween")
                .field("from", from)
                .field("to", to)
                .finish(),
            Predicate::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
