use crate::calendar::{CalendarError, WorkCalendar};
use crate::schedule::{ScheduleSnapshot, TaskSchedule};
use chrono::NaiveDate;

/// Maps offsets onto dates when rendering; the engine never sees this.
#[derive(Debug, Clone, Copy)]
pub struct DateProjection<'a> {
    pub calendar: &'a WorkCalendar,
    pub epoch: NaiveDate,
}

impl DateProjection<'_> {
    pub fn start_date(&self, task: &TaskSchedule) -> Result<NaiveDate, CalendarError> {
        self.calendar.offset_to_date(self.epoch, task.early_start)
    }

    pub fn finish_date(&self, task: &TaskSchedule) -> Result<NaiveDate, CalendarError> {
        self.calendar
            .finish_date(self.epoch, task.early_start, task.early_finish)
    }

    pub fn late_finish_date(&self, task: &TaskSchedule) -> Result<NaiveDate, CalendarError> {
        self.calendar
            .finish_date(self.epoch, task.late_start, task.late_finish)
    }
}

fn width(s: &str) -> usize {
    s.chars().count()
}

/// Renders rows as a boxed text table with left-aligned cells.
pub fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if ci < widths.len() && width(cell) > widths[ci] {
                widths[ci] = width(cell);
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &widths, headers.iter().copied());
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        push_row(&mut out, &widths, row.iter().map(String::as_str));
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_row<'a>(out: &mut String, widths: &[usize], mut cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for w in widths {
        let cell = cells.next().unwrap_or("");
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(w.saturating_sub(width(cell)) + 1));
        out.push('|');
    }
    out.push('\n');
}

fn status_marker(task: &TaskSchedule) -> &'static str {
    if task.is_critical {
        "critical"
    } else if task.is_near_critical {
        "near"
    } else {
        ""
    }
}

/// Snapshot as a text table in network order. The name column only appears
/// when at least one task is named; date columns only with a projection.
pub fn render_snapshot_table(
    snapshot: &ScheduleSnapshot,
    projection: Option<DateProjection<'_>>,
) -> Result<String, CalendarError> {
    let show_names = snapshot.tasks().iter().any(|t| !t.name.is_empty());

    let mut headers = vec!["id"];
    if show_names {
        headers.push("name");
    }
    headers.extend(["dur", "es", "ef", "ls", "lf", "tf", "ff", "status"]);
    if projection.is_some() {
        headers.extend(["start", "finish", "late_finish"]);
    }

    let rows: Vec<Vec<String>> = snapshot
        .tasks()
        .iter()
        .map(|task| -> Result<Vec<String>, CalendarError> {
            let mut row = vec![task.id.to_string()];
            if show_names {
                row.push(task.name.clone());
            }
            row.extend(
                [
                    task.duration,
                    task.early_start,
                    task.early_finish,
                    task.late_start,
                    task.late_finish,
                    task.total_float,
                    task.free_float,
                ]
                .iter()
                .map(ToString::to_string),
            );
            row.push(status_marker(task).to_string());
            if let Some(projection) = projection {
                row.push(projection.start_date(task)?.format("%Y-%m-%d").to_string());
                row.push(projection.finish_date(task)?.format("%Y-%m-%d").to_string());
                row.push(projection.late_finish_date(task)?.format("%Y-%m-%d").to_string());
            }
            Ok(row)
        })
        .collect::<Result<_, _>>()?;

    Ok(render_text_table(&headers, &rows))
}

/// Table followed by the one-line summary, as printed by the CLI.
pub fn render_report(
    snapshot: &ScheduleSnapshot,
    projection: Option<DateProjection<'_>>,
) -> Result<String, CalendarError> {
    let mut out = render_snapshot_table(snapshot, projection)?;
    out.push_str(&snapshot.summary().to_cli_summary());
    out.push('\n');
    if let Some(projection) = projection {
        if let Some(last) = snapshot.tasks().iter().max_by_key(|t| t.early_finish) {
            out.push_str(&format!(
                "project finish: {}\n",
                projection.finish_date(last)?.format("%Y-%m-%d")
            ));
        }
    }
    for reference in snapshot.ignored_references() {
        out.push_str(&format!(
            "ignored predecessor {} on task {}\n",
            reference.predecessor_id, reference.task_id
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_padded_to_the_widest_value() {
        let table = render_text_table(
            &["id", "dur"],
            &[
                vec!["A".to_string(), "3".to_string()],
                vec!["long-id".to_string(), "12".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "+---------+-----+");
        assert_eq!(lines[1], "| id      | dur |");
        assert_eq!(lines[3], "| A       | 3   |");
        assert_eq!(lines[4], "| long-id | 12  |");
        assert_eq!(lines.len(), 6);
    }
}
