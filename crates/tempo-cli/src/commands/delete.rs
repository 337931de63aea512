use anyhow::Result;
use tempo_core::error::CoreError;

use crate::cli::DeleteCommand;
use crate::store::TaskStore;
use crate::util::resolve_id;

/// Deletes one stored row. Deleting a template leaves its stored
/// exceptions in place.
pub fn delete_task(store: &mut TaskStore, command: DeleteCommand) -> Result<()> {
    let id = resolve_id(store, &command.id)?;
    let removed = store.remove(&id).ok_or_else(|| {
        CoreError::NotFound(format!("'{}' is a generated occurrence, not a stored task", id))
    })?;
    store.save()?;
    println!("Task '{}' deleted successfully.", removed.title);
    Ok(())
}
