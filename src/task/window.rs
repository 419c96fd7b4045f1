// src/task/window.rs

//! Validity window: optional `from` / `to` bounds on when a task may be due.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::errors::CadenceError;

static TIME_OF_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}(:\d{2})?$").expect("valid regex"));
static DATE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// One end of a validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// A fixed local date-time.
    At(NaiveDateTime),
    /// A local time of day, reapplied every calendar day.
    Daily(NaiveTime),
}

impl FromStr for Bound {
    type Err = CadenceError;

    /// Accepts `HH:MM[:SS]`, `YYYY-MM-DD` (midnight), and
    /// `YYYY-MM-DD HH:MM[:SS]` (a `T` separator is also accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if TIME_OF_DAY.is_match(s) {
            return parse_time(s).map(Bound::Daily).ok_or_else(|| invalid(s));
        }

        if DATE_ONLY.is_match(s) {
            return NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(Bound::At)
                .ok_or_else(|| invalid(s));
        }

        let normalized = s.replacen('T', " ", 1);
        ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
            .map(Bound::At)
            .ok_or_else(|| invalid(s))
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::At(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            Bound::Daily(t) => write!(f, "{}", t.format("%H:%M")),
        }
    }
}

pub(crate) fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

fn invalid(s: &str) -> CadenceError {
    CadenceError::Expression(format!(
        "Invalid date/time bound '{s}'; expected HH:MM, YYYY-MM-DD or YYYY-MM-DD HH:MM."
    ))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityWindow {
    pub from: Option<Bound>,
    pub to: Option<Bound>,
}

impl ValidityWindow {
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Whether `local` (already converted into the task's effective
    /// timezone, minute resolution) lies inside the window. Bounds are
    /// inclusive.
    pub fn contains(&self, local: NaiveDateTime) -> bool {
        let after_from = match self.from {
            None => true,
            Some(Bound::At(from)) => local >= from,
            Some(Bound::Daily(from)) => local.time() >= from,
        };
        let before_to = match self.to {
            None => true,
            Some(Bound::At(to)) => local <= to,
            Some(Bound::Daily(to)) => local.time() <= to,
        };
        after_from && before_to
    }
}
