//! Orchestration for taskbridge: detecting pending tasks, driving the
//! external compilation service, and executing tasks at most once per
//! detected instance.
//!
//! The heart of this crate is [`machine::Orchestrator`], a small state
//! machine designed around one assumption: the external build step is
//! unreliable and may tear the whole process down mid-pass. Every decision
//! that matters for recovery is durably committed before the action that
//! risks the restart.

pub mod classifier;
pub mod compile;
pub mod machine;
pub mod scanner;
pub mod watch;

pub use compile::{CommandCompileService, CompileEvent, CompileService, OutOfBandCompileService};
pub use machine::{Orchestrator, Phase};
pub use watch::run_watch_loop;
