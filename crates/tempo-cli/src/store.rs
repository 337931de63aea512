use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempo_core::models::Task;
use tempo_core::timezone::CalendarContext;
use thiserror::Error;
use tracing::debug;

const STORE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access task store '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Task store '{path}' is not valid: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported task store version {0}")]
    UnsupportedVersion(u32),

    #[error("Ambiguous ID '{0}'")]
    AmbiguousId(String, Vec<(String, String)>),
}

#[derive(Serialize, Deserialize, Debug)]
struct StoreFile {
    version: u32,
    tasks: Vec<Task>,
}

/// Every persisted task row, kept in a single JSON file.
///
/// Rows are templates, one-off tasks and materialized occurrences alike;
/// virtual occurrences are never written.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Loads the store at `path`; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let tasks = match fs::read_to_string(&path) {
            Ok(raw) => {
                let file: StoreFile = serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    source,
                })?;
                if file.version != STORE_VERSION {
                    return Err(StoreError::UnsupportedVersion(file.version));
                }
                file.tasks
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!(path = %path.display(), tasks = tasks.len(), "Opened task store");
        Ok(Self { path, tasks })
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let file = StoreFile {
            version: STORE_VERSION,
            tasks: self.tasks.clone(),
        };
        let raw = serde_json::to_string_pretty(&file).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, raw).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), tasks = self.tasks.len(), "Saved task store");
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn templates(&self) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.is_template()).cloned().collect()
    }

    /// Rows whose due day (in `ctx`) lies within `[start, end]`.
    pub fn due_between(&self, start: NaiveDate, end: NaiveDate, ctx: &CalendarContext) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| {
                let day = ctx.local_date(t.due_at);
                start <= day && day <= end
            })
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Inserts `task`, replacing any row with the same id.
    pub fn upsert(&mut self, task: Task) {
        match self.find_mut(&task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }
}
