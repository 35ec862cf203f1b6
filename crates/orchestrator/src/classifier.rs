//! Decides whether compiler diagnostics originate outside a task's own
//! source file.
//!
//! A "foreign" error means an unrelated file in the project fails to build
//! and blocks the shared compilation pass; the task author should be told
//! that is not their script's fault.

use std::env;
use std::path::{Path, PathBuf};
use taskbridge_core::{Diagnostic, TaskId, TaskResult};

/// Build a `compiler_error` result from a set of diagnostics.
///
/// Only `error` severity is kept. `foreign_errors` is true iff at least one
/// kept diagnostic's file resolves to a path other than the task's own
/// source file (compared case-insensitively). Diagnostics with no file
/// information are excluded from that decision, in either direction.
pub fn classify(task_id: &TaskId, task_source: &Path, diagnostics: &[Diagnostic]) -> TaskResult {
    let errors: Vec<Diagnostic> = diagnostics
        .iter()
        .filter(|d| d.is_actionable())
        .cloned()
        .collect();

    let own_path = normalize(task_source);
    let foreign = errors
        .iter()
        .filter(|d| !d.file.is_empty())
        .any(|d| normalize(Path::new(&d.file)) != own_path);

    TaskResult::compiler_error(task_id.clone(), errors, foreign)
}

/// Absolute, canonicalized (where possible), case-folded path string.
fn normalize(path: &Path) -> String {
    let absolute: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().unwrap_or_default().join(path)
    };
    let canonical = absolute.canonicalize().unwrap_or(absolute);
    canonical.to_string_lossy().to_lowercase()
}
