// src/cron/field.rs

//! A single parsed cron field, stored as a bitset of matching values.

use std::fmt;

/// Position of a field inside a five-part expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Minute,
        FieldKind::Hour,
        FieldKind::DayOfMonth,
        FieldKind::Month,
        FieldKind::DayOfWeek,
    ];

    pub fn index(self) -> usize {
        match self {
            FieldKind::Minute => 0,
            FieldKind::Hour => 1,
            FieldKind::DayOfMonth => 2,
            FieldKind::Month => 3,
            FieldKind::DayOfWeek => 4,
        }
    }

    /// Inclusive bounds accepted in the expression text.
    ///
    /// Day-of-week accepts 7 as an alias for Sunday (0).
    pub fn bounds(self) -> (u32, u32) {
        match self {
            FieldKind::Minute => (0, 59),
            FieldKind::Hour => (0, 23),
            FieldKind::DayOfMonth => (1, 31),
            FieldKind::Month => (1, 12),
            FieldKind::DayOfWeek => (0, 7),
        }
    }

    fn named_value(self, name: &str) -> Option<u32> {
        const MONTHS: [&str; 12] = [
            "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
        ];
        const DAYS: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

        let lower = name.to_ascii_lowercase();
        let (names, offset) = match self {
            FieldKind::Month => (&MONTHS[..], 1u32),
            FieldKind::DayOfWeek => (&DAYS[..], 0u32),
            _ => return None,
        };
        names
            .iter()
            .position(|n| *n == lower)
            .map(|i| i as u32 + offset)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Minute => "minute",
            FieldKind::Hour => "hour",
            FieldKind::DayOfMonth => "day-of-month",
            FieldKind::Month => "month",
            FieldKind::DayOfWeek => "day-of-week",
        };
        f.write_str(name)
    }
}

/// Set of values matched by one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronField {
    kind: FieldKind,
    bits: u64,
}

impl CronField {
    /// Parse a comma-separated field. Errors are plain reasons; the caller
    /// attaches the full expression.
    pub fn parse(kind: FieldKind, text: &str) -> Result<Self, String> {
        let mut bits = 0u64;

        for item in text.split(',') {
            if item.is_empty() {
                return Err(format!("empty list item in {kind} field '{text}'"));
            }
            bits |= parse_item(kind, item)?;
        }

        if kind == FieldKind::DayOfWeek && bits & (1 << 7) != 0 {
            bits = (bits & !(1 << 7)) | 1;
        }

        Ok(Self { kind, bits })
    }

    /// The `*` field.
    pub fn any(kind: FieldKind) -> Self {
        let (min, _) = kind.bounds();
        let bits = (min..=max_for_wildcard(kind)).fold(0u64, |acc, v| acc | 1 << v);
        Self { kind, bits }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn contains(&self, value: u32) -> bool {
        value < 64 && self.bits & (1 << value) != 0
    }

    /// Matching values in ascending order.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        (0..64u32).filter(move |v| self.contains(*v))
    }
}

fn parse_item(kind: FieldKind, item: &str) -> Result<u64, String> {
    let (min, max) = kind.bounds();

    let (range_part, step) = match item.split_once('/') {
        Some((range, step)) => {
            let step: u32 = step
                .parse()
                .map_err(|_| format!("invalid step '{step}' in {kind} field"))?;
            if step == 0 {
                return Err(format!("step cannot be zero in {kind} field"));
            }
            let span = max - min + 1;
            if step > span {
                return Err(format!("step {step} out of range 1-{span} in {kind} field"));
            }
            (range, Some(step))
        }
        None => (item, None),
    };

    let (start, end) = if range_part == "*" {
        (min, max_for_wildcard(kind))
    } else if let Some((a, b)) = range_part.split_once('-') {
        let a = parse_value(kind, a)?;
        let b = parse_value(kind, b)?;
        if a > b {
            return Err(format!("range {a}-{b} is reversed in {kind} field"));
        }
        (a, b)
    } else {
        let v = parse_value(kind, range_part)?;
        // `5/10` means "from 5 to the end of the field, every 10".
        match step {
            Some(_) => (v, max_for_wildcard(kind)),
            None => (v, v),
        }
    };

    if start < min || end > max {
        return Err(format!(
            "value out of range {min}-{max} in {kind} field '{item}'"
        ));
    }

    let step = step.unwrap_or(1);
    let mut bits = 0u64;
    let mut v = start;
    while v <= end {
        bits |= 1 << v;
        match v.checked_add(step) {
            Some(next) => v = next,
            None => break,
        }
    }
    Ok(bits)
}

fn max_for_wildcard(kind: FieldKind) -> u32 {
    // Sunday is already covered by 0; stepping up to 7 would double count it.
    match kind {
        FieldKind::DayOfWeek => 6,
        other => other.bounds().1,
    }
}

fn parse_value(kind: FieldKind, text: &str) -> Result<u32, String> {
    if let Ok(v) = text.parse::<u32>() {
        let (min, max) = kind.bounds();
        if v < min || v > max {
            return Err(format!(
                "value {v} out of range {min}-{max} in {kind} field"
            ));
        }
        return Ok(v);
    }
    kind.named_value(text)
        .ok_or_else(|| format!("invalid value '{text}' in {kind} field"))
}
