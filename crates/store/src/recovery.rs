//! Recovery diagnostics persisted ahead of a possible restart.
//!
//! While a compilation pass runs, the diagnostics accumulated in memory
//! would be lost if the build tears the process down. They are therefore
//! serialized to `pending_errors_<id>.json` on every accumulation, before
//! the restart-risking event finishes. Startup recovery consumes the file
//! as if the compilation had just reported those diagnostics.

use crate::layout::TaskFiles;
use std::fs;
use taskbridge_core::{Diagnostic, Result, TaskId};
use taskbridge_utils::write_atomic_string;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RecoveryStore {
    files: TaskFiles,
}

impl RecoveryStore {
    pub fn new(watch_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            files: TaskFiles::new(watch_dir),
        }
    }

    /// Overwrite the recovery file with the diagnostics collected so far.
    pub fn persist(&self, id: &TaskId, diagnostics: &[Diagnostic]) -> Result<()> {
        let path = self.files.recovery_path(id);
        debug!(
            "Persisting {} recovery diagnostics for task: {id}",
            diagnostics.len()
        );
        let json = serde_json::to_string_pretty(diagnostics)?;
        write_atomic_string(&path, &json)
    }

    /// Read and delete the recovery file, if one exists. Unparseable files
    /// are discarded: a half-written recovery file must not wedge the task.
    pub fn take(&self, id: &TaskId) -> Result<Option<Vec<Diagnostic>>> {
        let path = self.files.recovery_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| taskbridge_core::Error::file_system(&path, "read recovery file", e))?;
        fs::remove_file(&path)
            .map_err(|e| taskbridge_core::Error::file_system(&path, "remove recovery file", e))?;

        match serde_json::from_str::<Vec<Diagnostic>>(&content) {
            Ok(diagnostics) => Ok(Some(diagnostics)),
            Err(e) => {
                tracing::warn!("Discarding unparseable recovery file for {id}: {e}");
                Ok(None)
            }
        }
    }

    /// Drop the recovery file without consuming it.
    pub fn discard(&self, id: &TaskId) -> Result<()> {
        let path = self.files.recovery_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| taskbridge_core::Error::file_system(&path, "remove recovery file", e))?;
        }
        Ok(())
    }
}
