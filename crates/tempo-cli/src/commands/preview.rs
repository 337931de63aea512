use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use owo_colors::OwoColorize;
use tempo_core::identity::make_instance_id;
use tempo_core::recurrence::RecurrenceManager;
use tempo_core::timezone::CalendarContext;

use crate::cli::PreviewCommand;
use crate::config::Config;
use crate::parser::parse_date;
use crate::store::TaskStore;
use crate::util::resolve_id;
use crate::views::table::{display_occurrences, ViewOccurrence};

pub fn preview_series(
    store: &TaskStore,
    command: PreviewCommand,
    config: &Config,
    ctx: &CalendarContext,
    now: DateTime<Utc>,
) -> Result<()> {
    let id = resolve_id(store, &command.id)?;
    let template = store
        .find(&id)
        .cloned()
        .ok_or_else(|| anyhow!("'{}' is an occurrence; preview its recurring task instead", id))?;
    let manager = RecurrenceManager::new(template, *ctx)?;

    let from = match command.from.as_deref() {
        Some(raw) => parse_date(raw, ctx, now)?,
        None => ctx.today(now),
    };
    let count = command.count.unwrap_or(config.preview_count);

    let occurrences = occurrence_rows(store, &manager, manager.preview_occurrences(from, count))?;

    println!(
        "{} {}",
        manager.template().title.bright_white().bold(),
        format!("({})", manager.rule()).bright_black()
    );
    display_occurrences(&occurrences);
    Ok(())
}

/// Pairs each previewed day with its id and, for stored rows, completion.
///
/// The anchor is the template row itself, so it always counts as stored.
fn occurrence_rows(
    store: &TaskStore,
    manager: &RecurrenceManager,
    dates: Vec<NaiveDate>,
) -> Result<Vec<ViewOccurrence>> {
    let template = manager.template();
    dates
        .into_iter()
        .map(|date| -> Result<ViewOccurrence> {
            if date == manager.anchor() {
                return Ok(ViewOccurrence {
                    date,
                    id: template.id.clone(),
                    completed: Some(template.completed),
                });
            }
            let id = make_instance_id(&template.id, date, manager.context())?;
            let completed = store.find(&id).map(|stored| stored.completed);
            Ok(ViewOccurrence { date, id, completed })
        })
        .collect()
}
