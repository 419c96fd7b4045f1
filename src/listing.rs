// src/listing.rs

//! Text rendered by `cadence list` and `cadence info`.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::errors::{CadenceError, Result};
use crate::exec::shell::Platform;
use crate::task::{Task, TaskNumber, TaskSet};
use crate::types::ListFormat;

/// Number of upcoming dates shown by `info`.
pub const PREVIEW_RUN_DATES: usize = 5;

const LIST_HEADERS: [&str; 4] = ["#", "Task", "Expression", "Command to Run"];

#[derive(Debug, Serialize)]
struct ListRow {
    number: usize,
    task: String,
    expression: String,
    command: String,
}

/// Render the task list. An empty set renders as `No task found!` in every
/// format.
pub fn render_list(set: &TaskSet, format: ListFormat, platform: Platform) -> Result<String> {
    if set.is_empty() {
        return Ok("No task found!\n".to_string());
    }

    let rows: Vec<ListRow> = set
        .numbered()
        .map(|(number, task)| ListRow {
            number: number.get(),
            task: task.get_description().unwrap_or_default().to_string(),
            expression: task.expression(),
            command: task.kind().display(platform),
        })
        .collect();

    match format {
        ListFormat::Json => {
            let mut json = serde_json::to_string_pretty(&rows)
                .map_err(|e| CadenceError::Other(e.into()))?;
            json.push('\n');
            Ok(json)
        }
        ListFormat::Text => Ok(render_table(&rows)),
    }
}

fn render_table(rows: &[ListRow]) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.number.to_string(),
                row.task.clone(),
                row.expression.clone(),
                row.command.clone(),
            ]
        })
        .collect();

    let mut widths = LIST_HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = {
        let parts: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        format!("+{}+\n", parts.join("+"))
    };
    let line = |cells: [&str; 4]| {
        let parts: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!(" {cell:<width$} "))
            .collect();
        format!("|{}|\n", parts.join("|"))
    };

    let mut out = separator.clone();
    out.push_str(&line(LIST_HEADERS));
    out.push_str(&separator);
    for row in &cells {
        out.push_str(&line([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ]));
    }
    out.push_str(&separator);
    out
}

/// Details of one task plus its next run dates after `now`.
///
/// Dates are computed in the task's own timezone when it has one, otherwise
/// in `comparison`.
pub fn render_info(
    number: TaskNumber,
    task: &Task,
    comparison: Tz,
    now: DateTime<Utc>,
    platform: Platform,
) -> String {
    let tz = task.effective_timezone(comparison);
    let dates = task.rule().next_run_dates(PREVIEW_RUN_DATES, now, tz);

    let mut out = String::new();
    out.push_str(&format!("Task #{number} ({})\n\n", task.id()));
    out.push_str(&format!("  Command to run:        {}\n", task.kind().display(platform)));
    out.push_str(&format!(
        "  Description:           {}\n",
        task.get_description().unwrap_or("")
    ));
    out.push_str(&format!(
        "  Prevent overlapping:   {}\n",
        if task.prevents_overlapping() { "Yes" } else { "No" }
    ));
    out.push_str(&format!("  Cron expression:       {}\n", task.expression()));
    out.push_str(&format!(
        "  Task timezone:         {}\n",
        task.timezone_override()
            .map(|tz| tz.name().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    ));
    out.push_str(&format!("  Comparisons timezone:  {}\n", comparison.name()));

    out.push_str(&format!("\nExample run dates (timezone {}):\n", tz.name()));
    if dates.is_empty() {
        out.push_str("  (no run date within the next five years)\n");
    }
    for (idx, date) in dates.iter().enumerate() {
        out.push_str(&format!("  #{}: {}\n", idx + 1, date.format("%Y-%m-%d %H:%M:%S %Z")));
    }
    out
}
