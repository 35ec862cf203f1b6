//! Task execution for taskbridge.
//!
//! The executor resolves a task id to a runnable entry point through an
//! injected [`EntryPointResolver`], invokes it under scoped log capture, and
//! turns the outcome into a [`taskbridge_core::TaskResult`] that is always
//! persisted exactly once.

pub mod executor;
pub mod logs;
pub mod process;
pub mod resolver;

pub use executor::TaskExecutor;
pub use logs::LogSink;
pub use process::ArtifactResolver;
pub use resolver::{EntryPoint, EntryPointResolver, Resolution, TaskFault};
