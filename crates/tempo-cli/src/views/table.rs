use chrono::{DateTime, NaiveDate, Utc};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use tempo_core::models::{Task, TaskType};
use tempo_core::timezone::CalendarContext;

use crate::util::short_id;

/// Where a row in the agenda comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOrigin {
    Single,
    Template,
    /// Generated on the fly, not stored
    Virtual,
    /// Stored occurrence of a template
    Materialized,
}

impl TaskOrigin {
    pub fn of(task: &Task, persisted: bool) -> Self {
        if task.is_template() {
            TaskOrigin::Template
        } else if task.is_recurring_instance() {
            if persisted {
                TaskOrigin::Materialized
            } else {
                TaskOrigin::Virtual
            }
        } else {
            TaskOrigin::Single
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewTask {
    pub id: String,
    pub title: String,
    pub task_type: TaskType,
    pub completed: bool,
    pub due_at: DateTime<Utc>,
    pub origin: TaskOrigin,
    pub recurrence: Option<String>,
}

impl ViewTask {
    pub fn new(task: &Task, origin: TaskOrigin) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            task_type: task.task_type,
            completed: task.completed,
            due_at: task.due_at,
            origin,
            recurrence: task.recurrence().map(|rule| rule.to_string()),
        }
    }
}

pub fn display_agenda(tasks: &[ViewTask], ctx: &CalendarContext, now: DateTime<Utc>) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let today = ctx.today(now);
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Due", "Repeats"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&task.id)));

        let mut display_name = String::new();
        if task.origin != TaskOrigin::Single {
            display_name.push('↻');
            display_name.push(' ');
        }
        display_name.push_str(&task.title);
        if task.task_type == TaskType::Deep {
            display_name.push_str(" ¶");
        }

        let mut name_cell = Cell::new(display_name);
        if task.completed {
            name_cell = name_cell
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey);
        } else if task.origin == TaskOrigin::Virtual {
            name_cell = name_cell.fg(Color::Cyan);
        }
        row.add_cell(name_cell);

        row.add_cell(due_cell(task, ctx, today, now));
        row.add_cell(Cell::new(task.recurrence.as_deref().unwrap_or("")));
        table.add_row(row);
    }

    println!("{table}");
}

fn due_cell(task: &ViewTask, ctx: &CalendarContext, today: NaiveDate, now: DateTime<Utc>) -> Cell {
    let due_date = ctx.local_date(task.due_at);
    let text = format!(
        "{} ({})",
        ctx.format(task.due_at, "%a %Y-%m-%d %H:%M"),
        (task.due_at - now).humanize()
    );
    if task.completed {
        Cell::new(text)
    } else if due_date < today {
        Cell::new(text).fg(Color::Red) // Overdue
    } else if due_date == today {
        Cell::new(text).fg(Color::Yellow) // Due today
    } else {
        Cell::new(text)
    }
}

/// One row of a series preview.
#[derive(Debug, Clone)]
pub struct ViewOccurrence {
    pub date: NaiveDate,
    pub id: String,
    /// Completion of the stored row; None when the occurrence is only generated
    pub completed: Option<bool>,
}

pub fn display_occurrences(occurrences: &[ViewOccurrence]) {
    if occurrences.is_empty() {
        println!("No upcoming occurrences.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "ID", "Status"]);
    for (index, occurrence) in occurrences.iter().enumerate() {
        let status = match occurrence.completed {
            Some(true) => Cell::new("Completed").fg(Color::Green),
            Some(false) => Cell::new("Open").fg(Color::Yellow),
            None => Cell::new("Scheduled"),
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(occurrence.date.format("%a %Y-%m-%d")),
            Cell::new(short_id(&occurrence.id)),
            status,
        ]);
    }
    println!("{table}");
}
