//! File naming scheme for a task id inside the watch directory.

use std::path::PathBuf;
use taskbridge_core::constants::{
    DONE_FILE_EXT, PENDING_ERRORS_PREFIX, RESULT_FILE_EXT, RESULT_FILE_PREFIX,
};
use taskbridge_core::TaskId;

/// Resolves the per-task file paths within a watch directory.
#[derive(Debug, Clone)]
pub struct TaskFiles {
    watch_dir: PathBuf,
}

impl TaskFiles {
    pub fn new(watch_dir: impl Into<PathBuf>) -> Self {
        Self {
            watch_dir: watch_dir.into(),
        }
    }

    /// `result_<id>.json` — the serialized `TaskResult`.
    pub fn result_path(&self, id: &TaskId) -> PathBuf {
        self.watch_dir
            .join(format!("{RESULT_FILE_PREFIX}{id}.{RESULT_FILE_EXT}"))
    }

    /// `result_<id>.done` — the zero-byte completion marker.
    pub fn done_path(&self, id: &TaskId) -> PathBuf {
        self.watch_dir
            .join(format!("{RESULT_FILE_PREFIX}{id}.{DONE_FILE_EXT}"))
    }

    /// `pending_errors_<id>.json` — diagnostics saved before a possible restart.
    pub fn recovery_path(&self, id: &TaskId) -> PathBuf {
        self.watch_dir
            .join(format!("{PENDING_ERRORS_PREFIX}{id}.{RESULT_FILE_EXT}"))
    }

    /// `<id>.<ext>` — the externally authored task source.
    pub fn source_path(&self, id: &TaskId, source_ext: &str) -> PathBuf {
        self.watch_dir.join(format!("{id}.{source_ext}"))
    }
}
