use std::collections::HashSet;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Days, Utc};
use tempo_core::reconcile::merge;
use tempo_core::timezone::CalendarContext;

use crate::cli::AgendaCommand;
use crate::config::Config;
use crate::parser::parse_date;
use crate::store::TaskStore;
use crate::views::table::{display_agenda, TaskOrigin, ViewTask};

pub fn show_agenda(
    store: &TaskStore,
    command: AgendaCommand,
    config: &Config,
    ctx: &CalendarContext,
    now: DateTime<Utc>,
) -> Result<()> {
    let start = match command.from.as_deref() {
        Some(raw) => parse_date(raw, ctx, now)?,
        None => ctx.today(now),
    };
    let end = match command.to.as_deref() {
        Some(raw) => parse_date(raw, ctx, now)?,
        None => start
            .checked_add_days(Days::new(u64::from(config.agenda_days.max(1) - 1)))
            .ok_or_else(|| anyhow!("Agenda end date is out of range"))?,
    };
    if end < start {
        return Err(anyhow!("--to ({}) is before --from ({})", end, start));
    }

    let persisted = store.due_between(start, end, ctx);
    let persisted_ids: HashSet<String> = persisted.iter().map(|t| t.id.clone()).collect();
    let mut tasks = merge(persisted, &store.templates(), start, end, ctx);
    // An exception moved out of the range still stands for its original day.
    let stored_ids: HashSet<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
    tasks.retain(|task| persisted_ids.contains(&task.id) || !stored_ids.contains(task.id.as_str()));
    tasks.sort_by(|a, b| a.due_at.cmp(&b.due_at).then(a.order.cmp(&b.order)));

    if command.json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    let view_tasks: Vec<ViewTask> = tasks
        .iter()
        .map(|task| ViewTask::new(task, TaskOrigin::of(task, persisted_ids.contains(&task.id))))
        .collect();
    display_agenda(&view_tasks, ctx, now);
    println!(
        "\nShowing {} tasks from {} to {}",
        view_tasks.len(),
        start.format("%a %Y-%m-%d"),
        end.format("%a %Y-%m-%d")
    );
    Ok(())
}
