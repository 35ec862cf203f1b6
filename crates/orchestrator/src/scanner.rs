//! Read-only detection of the oldest not-yet-completed task.

use std::fs;
use std::path::Path;
use std::time::SystemTime;
use taskbridge_core::TaskId;
use taskbridge_store::TaskFiles;
use tracing::trace;

/// List task source files in `watch_dir` and return the pending task with
/// the oldest creation timestamp. A task is pending iff no completion
/// marker exists for its id. Returns `None` for an absent or empty
/// directory. Ties keep the directory listing order.
pub fn next_pending_task(watch_dir: &Path, source_ext: &str) -> Option<TaskId> {
    let entries = fs::read_dir(watch_dir).ok()?;
    let files = TaskFiles::new(watch_dir);

    let mut pending: Vec<(SystemTime, TaskId)> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(source_ext) {
            continue;
        }
        let Some(task_id) = TaskId::from_source_file(&path) else {
            continue;
        };
        if files.done_path(&task_id).exists() {
            trace!("Task {task_id} already completed, skipping");
            continue;
        }
        pending.push((creation_time(&path), task_id));
    }

    if pending.is_empty() {
        return None;
    }

    // Stable sort keeps the listing order for equal timestamps.
    pending.sort_by_key(|(created, _)| *created);
    pending.into_iter().next().map(|(_, id)| id)
}

/// Creation timestamp, falling back to mtime on filesystems without btime.
fn creation_time(path: &Path) -> SystemTime {
    match fs::metadata(path) {
        Ok(meta) => meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH),
        Err(_) => SystemTime::UNIX_EPOCH,
    }
}
