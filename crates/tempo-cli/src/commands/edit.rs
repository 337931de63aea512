use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use tempo_core::materialization::promote_instance;
use tempo_core::timezone::CalendarContext;

use crate::cli::EditCommand;
use crate::parser::parse_due;
use crate::store::TaskStore;
use crate::util::resolve_id;

pub fn edit_task(
    store: &mut TaskStore,
    command: EditCommand,
    ctx: &CalendarContext,
    now: DateTime<Utc>,
) -> Result<()> {
    if command.due.is_none() && command.content.is_none() {
        return Err(anyhow!("Nothing to change. Pass --due and/or --content"));
    }

    let id = resolve_id(store, &command.id)?;
    let mut task = match store.find(&id) {
        Some(stored) => stored.clone(),
        None => promote_instance(&id, &store.templates(), ctx, now)?,
    };

    if let Some(due) = command.due.as_deref() {
        task.reschedule(parse_due(due, ctx, now)?, now);
    }
    if let Some(content) = command.content {
        task.set_content(content, now);
    }

    let title = task.title.clone();
    store.upsert(task);
    store.save()?;

    println!("Task '{}' updated.", title);
    Ok(())
}
