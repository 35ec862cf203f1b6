//! The result/marker pair external pollers observe.
//!
//! The content file is always fully written and renamed into place before
//! the zero-byte marker is created. Any observer that sees the marker may
//! therefore assume the content file is complete and parseable.

use crate::layout::TaskFiles;
use std::fs;
use std::path::Path;
use taskbridge_core::{Result, TaskId, TaskResult};
use taskbridge_utils::write_atomic_string;
use tracing::{debug, info};

/// Sole writer of `TaskResult`s. Idempotent per task id.
#[derive(Debug, Clone)]
pub struct ResultStore {
    files: TaskFiles,
}

impl ResultStore {
    pub fn new(watch_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            files: TaskFiles::new(watch_dir),
        }
    }

    /// Persist a result: content first, marker strictly after.
    pub fn write(&self, result: &TaskResult) -> Result<()> {
        let result_path = self.files.result_path(&result.id);
        let done_path = self.files.done_path(&result.id);

        let json = serde_json::to_string_pretty(result)?;
        write_atomic_string(&result_path, &json)?;

        // The marker is created only once the content rename has returned.
        fs::write(&done_path, b"")
            .map_err(|e| taskbridge_core::Error::file_system(&done_path, "create marker", e))?;

        info!("Result written: {}", result_path.display());
        Ok(())
    }

    /// Whether a completion marker exists for this id.
    pub fn is_completed(&self, id: &TaskId) -> bool {
        self.files.done_path(id).exists()
    }

    /// Read back a persisted result.
    pub fn read(&self, id: &TaskId) -> Result<TaskResult> {
        let path = self.files.result_path(id);
        let content = fs::read_to_string(&path)
            .map_err(|e| taskbridge_core::Error::file_system(&path, "read result", e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Remove a stale result/marker pair before re-running a task.
    pub fn clean(&self, id: &TaskId) -> Result<()> {
        debug!("Cleaning stale result files for task: {id}");
        remove_if_exists(&self.files.result_path(id))?;
        remove_if_exists(&self.files.done_path(id))?;
        Ok(())
    }

    /// Remove every file belonging to a task: source, result pair, and any
    /// leftover recovery diagnostics.
    pub fn delete_task_files(&self, id: &TaskId, source_ext: &str) -> Result<()> {
        remove_if_exists(&self.files.source_path(id, source_ext))?;
        remove_if_exists(&self.files.result_path(id))?;
        remove_if_exists(&self.files.done_path(id))?;
        remove_if_exists(&self.files.recovery_path(id))?;
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .map_err(|e| taskbridge_core::Error::file_system(path, "remove", e))?;
    }
    Ok(())
}
