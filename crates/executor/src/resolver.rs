//! The dynamic-lookup seam between the executor and whatever actually hosts
//! task code.
//!
//! Resolution distinguishes "no such task code at all" from "code exists but
//! lacks the runnable entry-point shape", because the two produce different
//! runtime-error messages for the task author.

use crate::logs::LogSink;

/// A fault raised by invoked task code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFault {
    pub message: String,
    /// Origination trace, when the host can supply one.
    pub trace: Option<String>,
}

impl TaskFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: None,
        }
    }

    pub fn with_trace(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: Some(trace.into()),
        }
    }
}

/// A parameterless invocable located for a task id.
pub trait EntryPoint {
    /// Invoke the task. Log output emitted during the call goes to `sink`;
    /// a successful return may carry a stringified return value.
    fn invoke(&self, sink: &mut LogSink) -> Result<Option<String>, TaskFault>;
}

/// Outcome of looking up a task id.
pub enum Resolution {
    /// No code is loaded for this id.
    NotFound,
    /// Code exists but the required entry-point shape is absent.
    MissingEntryPoint { symbol: String },
    /// Ready to run.
    Runnable(Box<dyn EntryPoint>),
}

/// Injected capability resolving a task id to its entry point.
pub trait EntryPointResolver: Send + Sync {
    fn resolve(&self, task_id: &taskbridge_core::TaskId) -> Resolution;
}
