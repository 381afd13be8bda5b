use reorder_core::weeks;
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct WeekEntry {
    week_end: String,
    week_number: u32,
    label: String,
    short_label: String,
}

/// Lists every week-ending Sunday from the week of `from` through the week
/// of `to`.
pub fn run(from: &str, to: &str) -> CommandResult {
    let (start, end) = match (weeks::parse_date(from), weeks::parse_date(to)) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(error), _) | (_, Err(error)) => {
            return CommandResult::failure("weeks", "invalid_date", error.to_string(), 2);
        }
    };

    if start > end {
        return CommandResult::failure(
            "weeks",
            "invalid_range",
            format!("`--from` ({start}) must not be after `--to` ({end})"),
            2,
        );
    }

    let entries: Vec<WeekEntry> = weeks::weeks_between(start, weeks::week_end(end))
        .into_iter()
        .map(|week_end| WeekEntry {
            week_end: week_end.to_string(),
            week_number: weeks::week_number(week_end),
            label: weeks::week_range_label(week_end),
            short_label: weeks::short_week_label(week_end),
        })
        .collect();

    let lines: Vec<String> = entries
        .iter()
        .map(|entry| {
            format!(
                "W{:02}  {}  {:<10}  {}",
                entry.week_number, entry.week_end, entry.short_label, entry.label
            )
        })
        .collect();

    match serde_json::to_string(&entries) {
        Ok(machine) => {
            CommandResult { exit_code: 0, output: format!("{}\n{machine}", lines.join("\n")) }
        }
        Err(error) => CommandResult::failure("weeks", "serialization", error.to_string(), 1),
    }
}
