// src/task/frequency.rs

//! Cron shortcuts on [`Task`].
//!
//! Each shortcut rewrites some fields of the task's rule and leaves the rest
//! alone, so they compose: `task.weekdays()?.at("08:30")?` yields
//! `30 8 * * 1-5`. Every result is re-validated, so shortcuts return
//! `Result` even when their input is fixed.

use crate::cron::FieldKind;
use crate::errors::{CadenceError, Result};
use crate::task::Task;

impl Task {
    fn splice(self, edits: &[(FieldKind, &str)]) -> Result<Self> {
        let mut rule = self.rule().clone();
        for (kind, value) in edits {
            rule = rule.with_part(*kind, value)?;
        }
        Ok(self.with_rule(rule))
    }

    fn every_n_minutes(self, n: u32) -> Result<Self> {
        let step = format!("*/{n}");
        self.splice(&[(FieldKind::Minute, step.as_str())])
    }

    fn every_n_hours(self, n: u32) -> Result<Self> {
        let step = format!("*/{n}");
        self.splice(&[(FieldKind::Minute, "0"), (FieldKind::Hour, step.as_str())])
    }

    fn on_days(self, days: &str) -> Result<Self> {
        self.splice(&[(FieldKind::DayOfWeek, days)])
    }

    pub fn every_minute(self) -> Result<Self> {
        self.splice(&[(FieldKind::Minute, "*")])
    }

    pub fn every_two_minutes(self) -> Result<Self> {
        self.every_n_minutes(2)
    }

    pub fn every_three_minutes(self) -> Result<Self> {
        self.every_n_minutes(3)
    }

    pub fn every_four_minutes(self) -> Result<Self> {
        self.every_n_minutes(4)
    }

    pub fn every_five_minutes(self) -> Result<Self> {
        self.every_n_minutes(5)
    }

    pub fn every_ten_minutes(self) -> Result<Self> {
        self.every_n_minutes(10)
    }

    pub fn every_fifteen_minutes(self) -> Result<Self> {
        self.every_n_minutes(15)
    }

    pub fn every_thirty_minutes(self) -> Result<Self> {
        self.every_n_minutes(30)
    }

    pub fn hourly(self) -> Result<Self> {
        self.splice(&[(FieldKind::Minute, "0")])
    }

    /// Once an hour at `minute` past.
    pub fn hourly_at(self, minute: i32) -> Result<Self> {
        if minute < 0 {
            return Err(CadenceError::Expression(
                "Minute cannot be lower than '0'.".to_string(),
            ));
        }
        if minute > 59 {
            return Err(CadenceError::Expression(
                "Minute cannot be greater than '59'.".to_string(),
            ));
        }
        let minute = minute.to_string();
        self.splice(&[(FieldKind::Minute, minute.as_str())])
    }

    pub fn every_two_hours(self) -> Result<Self> {
        self.every_n_hours(2)
    }

    pub fn every_three_hours(self) -> Result<Self> {
        self.every_n_hours(3)
    }

    pub fn every_four_hours(self) -> Result<Self> {
        self.every_n_hours(4)
    }

    pub fn every_six_hours(self) -> Result<Self> {
        self.every_n_hours(6)
    }

    pub fn daily(self) -> Result<Self> {
        self.splice(&[(FieldKind::Minute, "0"), (FieldKind::Hour, "0")])
    }

    /// Sets minute and hour from `HH:MM` (or a bare `HH`).
    pub fn at(self, time: &str) -> Result<Self> {
        let (hour, minute) = split_time(time)?;
        let (hour, minute) = (hour.to_string(), minute.to_string());
        self.splice(&[
            (FieldKind::Minute, minute.as_str()),
            (FieldKind::Hour, hour.as_str()),
        ])
    }

    pub fn daily_at(self, time: &str) -> Result<Self> {
        self.at(time)
    }

    pub fn twice_daily(self, first_hour: u32, second_hour: u32) -> Result<Self> {
        let hours = format!("{first_hour},{second_hour}");
        self.splice(&[(FieldKind::Minute, "0"), (FieldKind::Hour, hours.as_str())])
    }

    pub fn weekly(self) -> Result<Self> {
        self.splice(&[
            (FieldKind::Minute, "0"),
            (FieldKind::Hour, "0"),
            (FieldKind::DayOfWeek, "0"),
        ])
    }

    /// Once a week on `day` (number or name) at `time`.
    pub fn weekly_on(self, day: &str, time: &str) -> Result<Self> {
        self.on_days(day)?.at(time)
    }

    pub fn monthly(self) -> Result<Self> {
        self.splice(&[
            (FieldKind::Minute, "0"),
            (FieldKind::Hour, "0"),
            (FieldKind::DayOfMonth, "1"),
        ])
    }

    pub fn quarterly(self) -> Result<Self> {
        self.splice(&[
            (FieldKind::Minute, "0"),
            (FieldKind::Hour, "0"),
            (FieldKind::DayOfMonth, "1"),
            (FieldKind::Month, "*/3"),
        ])
    }

    pub fn yearly(self) -> Result<Self> {
        self.splice(&[
            (FieldKind::Minute, "0"),
            (FieldKind::Hour, "0"),
            (FieldKind::DayOfMonth, "1"),
            (FieldKind::Month, "1"),
        ])
    }

    /// Restrict to the given day-of-week list, e.g. `"1,3,5"` or `"mon-fri"`.
    pub fn days(self, days: &str) -> Result<Self> {
        self.on_days(days)
    }

    pub fn weekdays(self) -> Result<Self> {
        self.on_days("1-5")
    }

    pub fn weekends(self) -> Result<Self> {
        self.on_days("6,0")
    }

    pub fn sundays(self) -> Result<Self> {
        self.on_days("0")
    }

    pub fn mondays(self) -> Result<Self> {
        self.on_days("1")
    }

    pub fn tuesdays(self) -> Result<Self> {
        self.on_days("2")
    }

    pub fn wednesdays(self) -> Result<Self> {
        self.on_days("3")
    }

    pub fn thursdays(self) -> Result<Self> {
        self.on_days("4")
    }

    pub fn fridays(self) -> Result<Self> {
        self.on_days("5")
    }

    pub fn saturdays(self) -> Result<Self> {
        self.on_days("6")
    }

    /// Apply a shortcut by name, as written in task files (`every = "..."`).
    pub fn frequency(self, name: &str) -> Result<Self> {
        match name.trim() {
            "minute" | "every_minute" => self.every_minute(),
            "two_minutes" | "every_two_minutes" => self.every_two_minutes(),
            "three_minutes" | "every_three_minutes" => self.every_three_minutes(),
            "four_minutes" | "every_four_minutes" => self.every_four_minutes(),
            "five_minutes" | "every_five_minutes" => self.every_five_minutes(),
            "ten_minutes" | "every_ten_minutes" => self.every_ten_minutes(),
            "fifteen_minutes" | "every_fifteen_minutes" => self.every_fifteen_minutes(),
            "thirty_minutes" | "every_thirty_minutes" => self.every_thirty_minutes(),
            "hourly" => self.hourly(),
            "two_hours" | "every_two_hours" => self.every_two_hours(),
            "three_hours" | "every_three_hours" => self.every_three_hours(),
            "four_hours" | "every_four_hours" => self.every_four_hours(),
            "six_hours" | "every_six_hours" => self.every_six_hours(),
            "daily" => self.daily(),
            "weekly" => self.weekly(),
            "monthly" => self.monthly(),
            "quarterly" => self.quarterly(),
            "yearly" => self.yearly(),
            "weekdays" => self.weekdays(),
            "weekends" => self.weekends(),
            "sundays" => self.sundays(),
            "mondays" => self.mondays(),
            "tuesdays" => self.tuesdays(),
            "wednesdays" => self.wednesdays(),
            "thursdays" => self.thursdays(),
            "fridays" => self.fridays(),
            "saturdays" => self.saturdays(),
            other => Err(CadenceError::Expression(format!(
                "Unknown frequency '{other}'."
            ))),
        }
    }
}

/// `"15:45"` → `(15, 45)`, `"3"` → `(3, 0)`. Range checks are left to the
/// cron parser.
fn split_time(time: &str) -> Result<(u32, u32)> {
    let invalid = || CadenceError::Expression(format!("Invalid time '{time}'; expected HH:MM."));

    let mut segments = time.trim().splitn(2, ':');
    let hour = segments
        .next()
        .and_then(|h| h.trim().parse::<u32>().ok())
        .ok_or_else(invalid)?;
    let minute = match segments.next() {
        Some(m) => m.trim().parse::<u32>().map_err(|_| invalid())?,
        None => 0,
    };
    Ok((hour, minute))
}
