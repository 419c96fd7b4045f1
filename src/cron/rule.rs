// src/cron/rule.rs

//! Five-field cron rule: parsing, minute-resolution due check, and forward
//! enumeration of run dates for previews.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, DurationRound, Timelike, Utc};
use chrono_tz::Tz;

use crate::cron::field::{CronField, FieldKind};
use crate::errors::{CadenceError, Result};

/// Default expression for new tasks: every minute.
pub const EVERY_MINUTE: &str = "* * * * *";

/// Search horizon for [`CronRule::next_run_dates`]: five years of minutes.
///
/// Expressions that can never match (e.g. `0 0 31 2 *`) stop here instead of
/// looping forever.
const MAX_SEARCH_MINUTES: i64 = 5 * 366 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronRule {
    parts: [String; 5],
    fields: [CronField; 5],
}

impl CronRule {
    pub fn parse(expression: &str) -> Result<Self> {
        let parts: Vec<&str> = expression.split_whitespace().collect();

        if parts.len() > 5 {
            return Err(CadenceError::Expression(format!(
                "Expression '{expression}' has more than five parts and this is not allowed."
            )));
        }
        if parts.len() < 5 {
            return Err(CadenceError::Expression(format!(
                "Expression '{expression}' has fewer than five parts."
            )));
        }

        let parts: [String; 5] = std::array::from_fn(|i| parts[i].to_string());
        let fields = parse_fields(&parts).map_err(|reason| {
            CadenceError::Expression(format!("Expression '{expression}' is invalid: {reason}."))
        })?;

        Ok(Self { parts, fields })
    }

    /// Canonical text (parts joined with single spaces).
    pub fn expression(&self) -> String {
        self.parts.join(" ")
    }

    pub fn part(&self, kind: FieldKind) -> &str {
        &self.parts[kind.index()]
    }

    pub fn field(&self, kind: FieldKind) -> &CronField {
        &self.fields[kind.index()]
    }

    /// Return a copy with one field replaced, re-validating the result.
    pub fn with_part(&self, kind: FieldKind, value: &str) -> Result<Self> {
        let mut parts = self.parts.clone();
        parts[kind.index()] = value.to_string();
        Self::parse(&parts.join(" "))
    }

    /// True iff every field matches `instant` seen in `tz`, at minute
    /// resolution.
    pub fn is_due(&self, instant: DateTime<Utc>, tz: Tz) -> bool {
        let local = instant.with_timezone(&tz);
        self.matches_hour(&local) && self.field(FieldKind::Minute).contains(local.minute())
    }

    /// The first `n` matching minutes strictly after the minute containing
    /// `from`, expressed in `tz`.
    ///
    /// May return fewer than `n` dates when the expression matches rarely or
    /// never within the search horizon.
    pub fn next_run_dates(&self, n: usize, from: DateTime<Utc>, tz: Tz) -> Vec<DateTime<Tz>> {
        let mut dates = Vec::with_capacity(n);
        let mut cursor = truncate_to_minute(from) + Duration::minutes(1);
        let mut searched = 0i64;

        while dates.len() < n && searched < MAX_SEARCH_MINUTES {
            let local = cursor.with_timezone(&tz);
            // Whole hours that cannot match are skipped in one step.
            let step = if !self.matches_hour(&local) {
                60 - i64::from(local.minute())
            } else {
                if self.field(FieldKind::Minute).contains(local.minute()) {
                    dates.push(local);
                }
                1
            };
            cursor += Duration::minutes(step);
            searched += step;
        }

        dates
    }

    /// Every field except the minute matches.
    fn matches_hour(&self, local: &DateTime<Tz>) -> bool {
        self.field(FieldKind::Hour).contains(local.hour())
            && self.field(FieldKind::DayOfMonth).contains(local.day())
            && self.field(FieldKind::Month).contains(local.month())
            && self
                .field(FieldKind::DayOfWeek)
                .contains(local.weekday().num_days_from_sunday())
    }
}

impl Default for CronRule {
    fn default() -> Self {
        let parts: [String; 5] = std::array::from_fn(|_| "*".to_string());
        let fields = FieldKind::ALL.map(CronField::any);
        Self { parts, fields }
    }
}

impl FromStr for CronRule {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CronRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}

fn parse_fields(parts: &[String; 5]) -> std::result::Result<[CronField; 5], String> {
    let mut fields = Vec::with_capacity(5);
    for (kind, text) in FieldKind::ALL.into_iter().zip(parts.iter()) {
        fields.push(CronField::parse(kind, text)?);
    }
    fields
        .try_into()
        .map_err(|_| "internal field count mismatch".to_string())
}

fn truncate_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .duration_trunc(Duration::minutes(1))
        .unwrap_or(instant)
}
