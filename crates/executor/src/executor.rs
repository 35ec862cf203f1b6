//! Turns a resolved entry point into a persisted task result.

use crate::logs::LogSink;
use crate::resolver::{EntryPointResolver, Resolution};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use taskbridge_core::{Result, TaskId, TaskResult};
use taskbridge_store::ResultStore;
use tracing::{info, warn};

/// Executes one task at a time and persists exactly one result per call,
/// regardless of which path the execution takes.
pub struct TaskExecutor {
    resolver: Arc<dyn EntryPointResolver>,
    results: ResultStore,
}

impl TaskExecutor {
    pub fn new(resolver: Arc<dyn EntryPointResolver>, results: ResultStore) -> Self {
        Self { resolver, results }
    }

    /// Resolve and run `task_id`, returning the result that was written.
    pub fn execute(&self, task_id: &TaskId) -> Result<TaskResult> {
        info!("Executing task: {task_id}");

        let result = match self.resolver.resolve(task_id) {
            Resolution::NotFound => TaskResult::runtime_error(
                task_id.clone(),
                vec![format!("Entry point not found: {task_id}")],
            ),
            Resolution::MissingEntryPoint { symbol } => TaskResult::runtime_error(
                task_id.clone(),
                vec![format!("Entry point '{symbol}' not found for task {task_id}")],
            ),
            Resolution::Runnable(entry) => {
                let mut sink = LogSink::new();
                // Panics in task code are faults, not orchestrator crashes.
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.invoke(&mut sink)));

                match outcome {
                    Ok(Ok(return_value)) => {
                        TaskResult::success(task_id.clone(), sink.into_lines(), return_value)
                    }
                    Ok(Err(fault)) => {
                        warn!("Task {task_id} faulted: {}", fault.message);
                        sink.log(format!("Runtime error: {}", fault.message));
                        if let Some(trace) = fault.trace {
                            sink.log(trace);
                        }
                        TaskResult::runtime_error(task_id.clone(), sink.into_lines())
                    }
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        warn!("Task {task_id} panicked: {message}");
                        sink.log(format!("Runtime error: {message}"));
                        TaskResult::runtime_error(task_id.clone(), sink.into_lines())
                    }
                }
            }
        };

        self.results.write(&result)?;
        Ok(result)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}
