use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Runs the `tempo` binary against a throwaway store in UTC.
pub struct CliTestHarness {
    temp_dir: TempDir,
    store_path: PathBuf,
}

impl CliTestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let store_path = temp_dir.path().join("tempo.json");
        Self {
            temp_dir,
            store_path,
        }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("tempo").expect("Failed to find tempo binary");
        cmd.current_dir(self.temp_dir.path())
            .env("TEMPO_STORE_PATH", &self.store_path)
            .env("TEMPO_TIMEZONE", "UTC")
            .env_remove("TEMPO_LOG");
        cmd
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs `agenda --json` over `[from, to]` and returns the task array.
    pub fn agenda_json(&self, from: &str, to: &str) -> Vec<Value> {
        let output = self
            .run_success(&["agenda", "--from", from, "--to", to, "--json"])
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("agenda output is not JSON");
        value.as_array().cloned().expect("agenda output is not an array")
    }

    /// Id of the only stored task.
    pub fn single_stored_id(&self) -> String {
        let raw = std::fs::read_to_string(&self.store_path).expect("store was not written");
        let value: Value = serde_json::from_str(&raw).expect("store is not JSON");
        let tasks = value["tasks"].as_array().expect("store has no task list");
        assert_eq!(tasks.len(), 1, "expected exactly one stored task");
        tasks[0]["id"].as_str().expect("task has no id").to_string()
    }
}

/// Task in `tasks` due at `due_at` (RFC 3339, UTC).
pub fn task_due_at<'a>(tasks: &'a [Value], due_at: &str) -> &'a Value {
    tasks
        .iter()
        .find(|task| task["due_at"] == due_at)
        .unwrap_or_else(|| panic!("no task due at {due_at}"))
}
