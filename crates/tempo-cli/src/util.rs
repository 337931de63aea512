use anyhow::{anyhow, Result};
use tempo_core::error::CoreError;
use tempo_core::identity::INSTANCE_ID_SEPARATOR;
use tempo_core::models::Task;

use crate::store::{StoreError, TaskStore};

const SHORT_ID_LEN: usize = 8;
const MIN_PREFIX_LEN: usize = 2;

/// Shortened form of a task or occurrence id for display.
///
/// Occurrence ids keep their date suffix so the short form can still be
/// resolved back to a single occurrence.
pub fn short_id(id: &str) -> String {
    match id.rsplit_once(INSTANCE_ID_SEPARATOR) {
        Some((template_id, suffix)) => format!(
            "{}{}{}",
            truncate(template_id),
            INSTANCE_ID_SEPARATOR,
            suffix
        ),
        None => truncate(id).to_string(),
    }
}

fn truncate(id: &str) -> &str {
    id.char_indices()
        .nth(SHORT_ID_LEN)
        .map_or(id, |(index, _)| &id[..index])
}

/// Expands a full id or unique prefix into a full id.
///
/// For occurrence ids only the template part may be abbreviated; the
/// result may name a virtual occurrence that is not stored yet.
pub fn resolve_id(store: &TaskStore, input: &str) -> Result<String> {
    if store.find(input).is_some() {
        return Ok(input.to_string());
    }
    match input.rsplit_once(INSTANCE_ID_SEPARATOR) {
        Some((template_prefix, suffix)) => {
            let template = resolve_prefix(store.tasks().iter().filter(|t| t.is_template()), template_prefix)?;
            Ok(format!("{}{}{}", template.id, INSTANCE_ID_SEPARATOR, suffix))
        }
        None => resolve_prefix(store.tasks().iter(), input).map(|task| task.id.clone()),
    }
}

fn resolve_prefix<'a>(candidates: impl Iterator<Item = &'a Task>, prefix: &str) -> Result<&'a Task> {
    if prefix.len() < MIN_PREFIX_LEN {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let matches: Vec<&Task> = candidates.filter(|t| t.id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [task] => Ok(task),
        [] => Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            prefix
        )))),
        _ => {
            let task_info = matches
                .iter()
                .map(|t| (short_id(&t.id), t.title.clone()))
                .collect();
            Err(anyhow!(StoreError::AmbiguousId(prefix.to_string(), task_info)))
        }
    }
}
