use anyhow::Result;
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use tempo_core::materialization::promote_instance;
use tempo_core::timezone::CalendarContext;

use crate::cli::CompleteCommand;
use crate::store::TaskStore;
use crate::util::resolve_id;

pub fn complete_task(
    store: &mut TaskStore,
    command: CompleteCommand,
    ctx: &CalendarContext,
    now: DateTime<Utc>,
) -> Result<()> {
    let id = resolve_id(store, &command.id)?;
    let task = match store.find(&id) {
        Some(stored) => {
            let mut task = stored.clone();
            task.toggle_completed(now);
            task
        }
        // Virtual occurrence: store it as an exception
        None => {
            let mut task = promote_instance(&id, &store.templates(), ctx, now)?;
            task.toggle_completed(now);
            task
        }
    };

    let verb = if task.completed { "Completed" } else { "Reopened" };
    let title = task.title.clone();
    let due_at = task.due_at;
    store.upsert(task);
    store.save()?;

    println!(
        "{} '{}' ({})",
        verb.green().bold(),
        title,
        ctx.format(due_at, "%a %Y-%m-%d")
    );
    Ok(())
}
