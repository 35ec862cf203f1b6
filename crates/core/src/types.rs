//! Domain types for the task lifecycle.
//!
//! A task appears when an externally authored source file lands in the watch
//! directory, stays pending until a completion marker exists for its id, and
//! is completed once the result/marker pair has been written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Stable identifier of a task, derived from its source file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a task id from a source file path (`/watch/Foo.src` -> `Foo`).
    pub fn from_source_file(path: &Path) -> Option<Self> {
        path.file_stem()
            .map(|stem| Self(stem.to_string_lossy().into_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Severity of a compiler diagnostic. Only `Error` is actionable; anything
/// below it never fails a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single compiler-reported issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Originating file path as reported by the compiler. May be empty when
    /// the compiler could not attribute the issue to a file.
    pub file: String,
    pub line: u32,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            file: file.into(),
            line,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Terminal status of a task execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Success,
    RuntimeError,
    CompilerError,
}

/// The structured outcome of a task, owned solely by the result store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub id: TaskId,
    pub status: TaskStatus,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<String>,
    #[serde(default)]
    pub compiler_errors: Vec<Diagnostic>,
    #[serde(default)]
    pub foreign_errors: bool,
}

impl TaskResult {
    pub fn success(id: TaskId, logs: Vec<String>, return_value: Option<String>) -> Self {
        Self {
            id,
            status: TaskStatus::Success,
            logs,
            return_value,
            compiler_errors: Vec::new(),
            foreign_errors: false,
        }
    }

    pub fn runtime_error(id: TaskId, logs: Vec<String>) -> Self {
        Self {
            id,
            status: TaskStatus::RuntimeError,
            logs,
            return_value: None,
            compiler_errors: Vec::new(),
            foreign_errors: false,
        }
    }

    pub fn compiler_error(id: TaskId, errors: Vec<Diagnostic>, foreign_errors: bool) -> Self {
        Self {
            id,
            status: TaskStatus::CompilerError,
            logs: Vec::new(),
            return_value: None,
            compiler_errors: errors,
            foreign_errors,
        }
    }
}

/// Durable record of the single task currently awaiting compilation.
///
/// At most one marker is live system-wide; it is cleared exactly when the
/// compilation outcome for its task has been consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMarker {
    pub task_id: TaskId,
    /// Unix timestamp (seconds) when the marker was set.
    pub since: u64,
}

impl PendingMarker {
    pub fn new(task_id: TaskId, since: u64) -> Self {
        Self { task_id, since }
    }

    /// Seconds elapsed since the marker was set, saturating at zero.
    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.since)
    }
}
